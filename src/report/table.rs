use std::io::Write;
use std::path::Path;

use crate::aggregate::ReportRow;
use crate::error::Result;

/// Write `ticker,count` lines to `path`, replacing any previous file.
/// No header row; an empty report leaves an empty file.
pub fn write_table<P: AsRef<Path>>(path: P, rows: &[ReportRow]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_rows(file, rows)
}

pub fn write_rows<W: Write>(writer: W, rows: &[ReportRow]) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    for row in rows {
        let count = row.null_count.to_string();
        csv_writer.write_record([row.ticker.as_str(), count.as_str()])?;
    }
    csv_writer.flush()?;
    Ok(())
}
