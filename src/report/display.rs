use std::io::{self, IsTerminal};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame, Terminal,
};

use crate::aggregate::ReportRow;
use crate::error::Result;
use crate::report::ChartStyle;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Show the report as a bar chart in the terminal until `q` or `Esc`.
/// Returns false without drawing anything when no terminal is attached.
pub fn present(rows: &[ReportRow], style: &ChartStyle) -> Result<bool> {
    if !io::stdout().is_terminal() || !io::stdin().is_terminal() {
        return Ok(false);
    }

    enable_raw_mode()?;
    let mut terminal = restore_on_error(enter_screen, || {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    })?;

    let result = run_loop(&mut terminal, rows, style);

    // Restore terminal regardless of result
    let restored = disable_raw_mode()
        .and_then(|_| execute!(terminal.backend_mut(), LeaveAlternateScreen))
        .and_then(|_| terminal.show_cursor());

    result?;
    restored?;
    Ok(true)
}

fn enter_screen() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

/// Run `setup`; if it fails, run `restore` before handing back the error.
fn restore_on_error<T>(
    setup: impl FnOnce() -> Result<T>,
    restore: impl FnOnce(),
) -> Result<T> {
    setup().map_err(|e| {
        restore();
        e
    })
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    rows: &[ReportRow],
    style: &ChartStyle,
) -> Result<()> {
    loop {
        terminal.draw(|f| render(f, rows, style))?;

        // Redraw periodically so a resize is picked up.
        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
                {
                    return Ok(());
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(f: &mut Frame, rows: &[ReportRow], style: &ChartStyle) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // chart
            Constraint::Length(1), // footer
        ])
        .split(f.area());

    render_chart(f, rows, style, chunks[0]);
    render_footer(f, style, chunks[1]);
}

fn render_chart(f: &mut Frame, rows: &[ReportRow], style: &ChartStyle, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {} ", style.title),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    if rows.is_empty() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "No ticker returned a null contract address.",
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let bars: Vec<Bar> = rows
        .iter()
        .map(|r| {
            Bar::default()
                .value(u64::from(r.null_count))
                .label(Line::from(r.ticker.clone()))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width(area.width, rows.len()))
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Green))
        .value_style(Style::default().fg(Color::Black).bg(Color::Green));

    f.render_widget(chart, area);
}

fn render_footer(f: &mut Frame, style: &ChartStyle, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" [q] ", Style::default().fg(Color::Yellow)),
        Span::raw("quit  "),
        Span::styled(
            format!("x: {}  y: {}", style.x_label, style.y_label),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

/// Widest bar that still fits every row inside the bordered area, within 3..=12.
fn bar_width(area_width: u16, bars: usize) -> u16 {
    let inner = area_width.saturating_sub(2) as usize;
    let per_bar = inner / bars.max(1);
    (per_bar.saturating_sub(1) as u16).clamp(3, 12)
}
