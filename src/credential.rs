use std::io::{self, BufRead, Write};

use crate::config::{Config, API_KEY_PROMPT};
use crate::error::Result;

/// The API key from COVALENT_API_KEY, or else one line typed at the prompt.
/// The key is not validated; a bad key surfaces as an API error on the probe.
pub fn obtain(cfg: &Config) -> Result<String> {
    if let Some(key) = &cfg.api_key {
        return Ok(key.clone());
    }
    let stdin = io::stdin();
    prompt(&mut stdin.lock(), &mut io::stdout())
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<String> {
    write!(output, "{API_KEY_PROMPT}")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
