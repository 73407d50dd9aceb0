//! TUI signal dashboard using ratatui.

use chrono::{DateTime, Utc};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame, Terminal,
};
use signal_core::types::{IndicatorResult, SignalKind};
use std::cmp::Ordering;
use std::io;
use std::time::Duration;
use tracing::debug;

/// One watched symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchRow {
    pub symbol: String,
    pub price: Option<f64>,
    pub change_pct: Option<f64>,
    /// Price came from the push stream rather than a REST poll
    pub live: bool,
    pub result: IndicatorResult,
}

impl WatchRow {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            price: None,
            change_pct: None,
            live: false,
            result: IndicatorResult::NEUTRAL,
        }
    }
}

/// Dashboard state.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub interval: String,
    pub rows: Vec<WatchRow>,
    pub messages: Vec<String>,
    pub last_refresh: Option<DateTime<Utc>>,
}

/// Sortable table columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Symbol,
    Price,
    Change,
    Adx,
    Rsi,
    Ema50,
    Ema200,
    Signal,
    Strength,
}

impl SortColumn {
    const ALL: [SortColumn; 9] = [
        SortColumn::Symbol,
        SortColumn::Price,
        SortColumn::Change,
        SortColumn::Adx,
        SortColumn::Rsi,
        SortColumn::Ema50,
        SortColumn::Ema200,
        SortColumn::Signal,
        SortColumn::Strength,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SortColumn::Symbol => "Symbol",
            SortColumn::Price => "Price",
            SortColumn::Change => "24h %",
            SortColumn::Adx => "ADX",
            SortColumn::Rsi => "RSI",
            SortColumn::Ema50 => "EMA50",
            SortColumn::Ema200 => "EMA200",
            SortColumn::Signal => "Signal",
            SortColumn::Strength => "Strength",
        }
    }

    /// Column bound to a number key, `'1'` for the first.
    pub fn from_key(c: char) -> Option<SortColumn> {
        let index = c.to_digit(10)? as usize;
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub column: SortColumn,
    pub descending: bool,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self {
            column: SortColumn::Strength,
            descending: true,
        }
    }
}

impl SortOrder {
    /// Select a column; selecting the current column flips the direction.
    pub fn select(&mut self, column: SortColumn) {
        if self.column == column {
            self.descending = !self.descending;
        } else {
            self.column = column;
            self.descending = column != SortColumn::Symbol;
        }
    }
}

fn signal_rank(kind: SignalKind) -> u8 {
    match kind {
        SignalKind::StrongSell => 0,
        SignalKind::Neutral => 1,
        SignalKind::StrongBuy => 2,
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Sort rows in place. Missing prices sort below any known price.
pub fn sort_rows(rows: &mut [WatchRow], order: SortOrder) {
    rows.sort_by(|a, b| {
        let ord = match order.column {
            SortColumn::Symbol => a.symbol.cmp(&b.symbol),
            SortColumn::Price => cmp_f64(
                a.price.unwrap_or(f64::MIN),
                b.price.unwrap_or(f64::MIN),
            ),
            SortColumn::Change => cmp_f64(
                a.change_pct.unwrap_or(f64::MIN),
                b.change_pct.unwrap_or(f64::MIN),
            ),
            SortColumn::Adx => cmp_f64(a.result.adx, b.result.adx),
            SortColumn::Rsi => cmp_f64(a.result.rsi, b.result.rsi),
            SortColumn::Ema50 => cmp_f64(a.result.ema50, b.result.ema50),
            SortColumn::Ema200 => cmp_f64(a.result.ema200, b.result.ema200),
            SortColumn::Signal => signal_rank(a.result.signal).cmp(&signal_rank(b.result.signal)),
            SortColumn::Strength => cmp_f64(a.result.strength, b.result.strength),
        };
        if order.descending {
            ord.reverse()
        } else {
            ord
        }
    });
}

/// ADX colour: strong trend green, trending blue.
pub fn adx_color(adx: f64) -> Color {
    if adx >= 50.0 {
        Color::Green
    } else if adx >= 25.0 {
        Color::Blue
    } else {
        Color::Gray
    }
}

/// RSI colour: overbought red, oversold green.
pub fn rsi_color(rsi: f64) -> Color {
    if rsi >= 70.0 {
        Color::Red
    } else if rsi <= 30.0 {
        Color::Green
    } else {
        Color::Gray
    }
}

pub fn signal_color(kind: SignalKind) -> Color {
    match kind {
        SignalKind::StrongBuy => Color::Green,
        SignalKind::StrongSell => Color::Red,
        SignalKind::Neutral => Color::Yellow,
    }
}

/// Format a price; polled prices carry a trailing `*`.
pub fn format_price(price: Option<f64>, live: bool) -> String {
    match price {
        None => "-".to_string(),
        Some(p) => {
            let digits = if p >= 1.0 { 2 } else { 6 };
            let marker = if live { "" } else { "*" };
            format!("${p:.digits$}{marker}")
        }
    }
}

/// TUI Dashboard.
pub struct Dashboard {
    refresh_ms: u64,
    sort: SortOrder,
}

impl Dashboard {
    /// Create a new dashboard.
    pub fn new(refresh_ms: u64) -> Self {
        Self {
            refresh_ms,
            sort: SortOrder::default(),
        }
    }

    /// Run the dashboard until the user quits. Blocks the calling thread.
    pub fn run<F>(&mut self, mut get_state: F) -> io::Result<()>
    where
        F: FnMut() -> DashboardState,
    {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.run_loop(&mut terminal, &mut get_state);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        res
    }

    fn run_loop<F>(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        get_state: &mut F,
    ) -> io::Result<()>
    where
        F: FnMut() -> DashboardState,
    {
        loop {
            let mut state = get_state();
            sort_rows(&mut state.rows, self.sort);
            terminal.draw(|f| self.ui(f, &state))?;

            if event::poll(Duration::from_millis(self.refresh_ms))? {
                if let Event::Key(key) = event::read()? {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('r') => self.sort.descending = !self.sort.descending,
                        KeyCode::Char(c) => {
                            if let Some(column) = SortColumn::from_key(c) {
                                self.sort.select(column);
                                debug!(column = column.title(), descending = self.sort.descending, "Sort changed");
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    fn ui(&self, frame: &mut Frame, state: &DashboardState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(4), // Summary
                Constraint::Min(8),    // Signals
                Constraint::Length(7), // Messages
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0], state);
        self.render_summary(frame, chunks[1], state);
        self.render_signals(frame, chunks[2], state);
        self.render_messages(frame, chunks[3], state);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let refreshed = state
            .last_refresh
            .map(|t| t.format("%H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "pending".to_string());

        let header = Paragraph::new(vec![Line::from(vec![
            Span::styled(
                "Signal Desk",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            Span::styled(state.interval.as_str(), Style::default().fg(Color::Cyan)),
            Span::raw(format!(" | refreshed {refreshed}")),
            Span::raw(" | 1-9 sort, r reverse, q quit"),
        ])])
        .block(Block::default().borders(Borders::ALL).title("Watch list"));
        frame.render_widget(header, area);
    }

    fn render_summary(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let count = |kind| state.rows.iter().filter(|r| r.result.signal == kind).count();
        let delayed = state.rows.iter().filter(|r| !r.live).count();

        let summary = Paragraph::new(vec![Line::from(vec![
            Span::raw("Strong buy: "),
            Span::styled(
                count(SignalKind::StrongBuy).to_string(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  |  Strong sell: "),
            Span::styled(
                count(SignalKind::StrongSell).to_string(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  |  Neutral: "),
            Span::styled(
                count(SignalKind::Neutral).to_string(),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw(format!("  |  Delayed prices: {delayed}")),
        ])])
        .block(Block::default().borders(Borders::ALL).title("Summary"));
        frame.render_widget(summary, area);
    }

    fn render_signals(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let header_cells = SortColumn::ALL.iter().map(|column| {
            let mut title = column.title().to_string();
            if *column == self.sort.column {
                title.push_str(if self.sort.descending { " ▼" } else { " ▲" });
            }
            Cell::from(title).style(Style::default().add_modifier(Modifier::BOLD))
        });
        let header = Row::new(header_cells).height(1);

        let rows = state.rows.iter().map(|row| {
            let r = &row.result;
            let change_color = match row.change_pct {
                Some(c) if c >= 0.0 => Color::Green,
                Some(_) => Color::Red,
                None => Color::Gray,
            };

            Row::new(vec![
                Cell::from(row.symbol.clone()),
                Cell::from(format_price(row.price, row.live)),
                Cell::from(
                    row.change_pct
                        .map(|c| format!("{c:+.2}%"))
                        .unwrap_or_else(|| "-".to_string()),
                )
                .style(Style::default().fg(change_color)),
                Cell::from(format!("{:.2}", r.adx)).style(Style::default().fg(adx_color(r.adx))),
                Cell::from(format!("{:.2}", r.rsi)).style(Style::default().fg(rsi_color(r.rsi))),
                Cell::from(format!("{:.4}", r.ema50)),
                Cell::from(format!("{:.4}", r.ema200)),
                Cell::from(r.signal.label()).style(
                    Style::default()
                        .fg(signal_color(r.signal))
                        .add_modifier(Modifier::BOLD),
                ),
                Cell::from(format!("{:.0}%", r.strength)),
            ])
        });

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(13),
                Constraint::Percentage(13),
                Constraint::Percentage(9),
                Constraint::Percentage(8),
                Constraint::Percentage(8),
                Constraint::Percentage(13),
                Constraint::Percentage(13),
                Constraint::Percentage(12),
                Constraint::Percentage(11),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Signals"));

        frame.render_widget(table, area);
    }

    fn render_messages(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let messages: Vec<Line> = state
            .messages
            .iter()
            .rev()
            .take(5)
            .map(|m| Line::from(m.as_str()))
            .collect();

        let paragraph =
            Paragraph::new(messages).block(Block::default().borders(Borders::ALL).title("Log"));
        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(symbol: &str, price: Option<f64>, signal: SignalKind, strength: f64) -> WatchRow {
        WatchRow {
            price,
            result: IndicatorResult {
                signal,
                strength,
                ..IndicatorResult::NEUTRAL
            },
            ..WatchRow::new(symbol)
        }
    }

    fn symbols(rows: &[WatchRow]) -> Vec<&str> {
        rows.iter().map(|r| r.symbol.as_str()).collect()
    }

    #[test]
    fn test_sort_by_strength_descending() {
        let mut rows = vec![
            row("A", Some(1.0), SignalKind::Neutral, 10.0),
            row("B", Some(2.0), SignalKind::StrongBuy, 90.0),
            row("C", Some(3.0), SignalKind::StrongSell, 50.0),
        ];
        sort_rows(&mut rows, SortOrder::default());
        assert_eq!(symbols(&rows), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_sort_by_signal_and_missing_price() {
        let mut rows = vec![
            row("A", None, SignalKind::Neutral, 0.0),
            row("B", Some(2.0), SignalKind::StrongSell, 0.0),
            row("C", Some(1.0), SignalKind::StrongBuy, 0.0),
        ];

        sort_rows(
            &mut rows,
            SortOrder {
                column: SortColumn::Signal,
                descending: true,
            },
        );
        assert_eq!(symbols(&rows), vec!["C", "A", "B"]);

        sort_rows(
            &mut rows,
            SortOrder {
                column: SortColumn::Price,
                descending: false,
            },
        );
        assert_eq!(symbols(&rows), vec!["A", "C", "B"]);
    }

    #[test]
    fn test_sort_order_select() {
        let mut order = SortOrder::default();
        order.select(SortColumn::Strength);
        assert!(!order.descending);

        order.select(SortColumn::Symbol);
        assert_eq!(order.column, SortColumn::Symbol);
        assert!(!order.descending);

        order.select(SortColumn::Adx);
        assert!(order.descending);
    }

    #[test]
    fn test_column_keys() {
        assert_eq!(SortColumn::from_key('1'), Some(SortColumn::Symbol));
        assert_eq!(SortColumn::from_key('9'), Some(SortColumn::Strength));
        assert_eq!(SortColumn::from_key('0'), None);
        assert_eq!(SortColumn::from_key('x'), None);
    }

    #[test]
    fn test_colours() {
        assert_eq!(adx_color(55.0), Color::Green);
        assert_eq!(adx_color(30.0), Color::Blue);
        assert_eq!(adx_color(10.0), Color::Gray);
        assert_eq!(rsi_color(75.0), Color::Red);
        assert_eq!(rsi_color(25.0), Color::Green);
        assert_eq!(rsi_color(50.0), Color::Gray);
        assert_eq!(signal_color(SignalKind::Neutral), Color::Yellow);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Some(42_000.5), true), "$42000.50");
        assert_eq!(format_price(Some(42_000.5), false), "$42000.50*");
        assert_eq!(format_price(Some(0.000123), true), "$0.000123");
        assert_eq!(format_price(None, true), "-");
    }
}
