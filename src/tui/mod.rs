//! Ratatui-based terminal dashboard.
//!
//! Layout: header, two insight cards with sparklines, the key numbers table,
//! and three charts (price vs baseline, volatility regime, residual-load
//! drivers). Focusing a card or a key-number row highlights the chart it
//! explains and fades the others; the [`HighlightStore`] owns that state and
//! the status line follows it through a subscription.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, Paragraph,
        canvas::{Canvas, Line as CanvasLine},
    },
};

use crate::app::pipeline::{Brief, build_brief};
use crate::cli::BriefArgs;
use crate::domain::{BriefConfig, CorrelationSample, HighlightTarget, MAX_DAYS};
use crate::error::AppError;
use crate::highlight::{Emphasis, HighlightStore, Subscription};
use crate::report::{InsightCard, MetricRow, metric_rows};

mod plotters_chart;

use plotters_chart::{ChartSeries, SeriesChart, SeriesStyle};

/// Smallest day count that still yields every key number.
const MIN_DAYS: usize = 4;

/// Start the dashboard.
pub fn run(args: BriefArgs) -> Result<(), AppError> {
    // Build before touching the terminal so bad flags print normally.
    let mut app = App::with_brief(crate::app::brief_from_args(&args)?);
    if let Some(path) = &args.export_json {
        crate::io::write_brief_json(path, &app.brief)?;
    }

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Something the user can focus with Tab: a card or a key-number row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Card(usize),
    Metric(usize),
}

struct App {
    config: BriefConfig,
    brief: Brief,
    store: HighlightStore,
    highlight_feed: Subscription,
    focus: Option<usize>,
    status: String,
}

impl App {
    #[cfg(test)]
    fn new(config: BriefConfig) -> Result<Self, AppError> {
        Ok(Self::with_brief(build_brief(&config)?))
    }

    fn with_brief(brief: Brief) -> Self {
        let mut store = HighlightStore::new();
        let highlight_feed = store.subscribe();
        Self {
            config: brief.config.clone(),
            brief,
            store,
            highlight_feed,
            focus: None,
            status: "Tab to explore, 1/2/3 to highlight a chart.".to_string(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply one key press. Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('1') => self.toggle(HighlightTarget::Price),
            KeyCode::Char('2') => self.toggle(HighlightTarget::Volatility),
            KeyCode::Char('3') => self.toggle(HighlightTarget::Driver),
            KeyCode::Tab => self.move_focus(1),
            KeyCode::BackTab => self.move_focus(-1),
            KeyCode::Esc => {
                self.focus = None;
                self.store.clear();
            }
            KeyCode::Char('r') => {
                let mut next = self.config.clone();
                next.seed = next.seed.wrapping_add(1);
                self.rebuild(next);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let mut next = self.config.clone();
                next.days = (next.days + 1).min(MAX_DAYS);
                self.rebuild(next);
            }
            KeyCode::Char('-') => {
                let mut next = self.config.clone();
                next.days = next.days.saturating_sub(1).max(MIN_DAYS);
                self.rebuild(next);
            }
            _ => {}
        }

        if let Some(active) = self.highlight_feed.latest() {
            self.status = format!(
                "highlight: {}",
                active.map(HighlightTarget::display_name).unwrap_or("none")
            );
        }
        false
    }

    fn toggle(&mut self, target: HighlightTarget) {
        self.focus = None;
        self.store.set(toggle(self.store.current(), target));
    }

    fn focusables(&self) -> Vec<Focus> {
        let cards = (0..self.brief.cards.len()).map(Focus::Card);
        let rows = (0..metric_rows(&self.brief.metrics).len()).map(Focus::Metric);
        cards.chain(rows).collect()
    }

    fn focus_target(&self, focus: Focus) -> Option<HighlightTarget> {
        match focus {
            Focus::Card(i) => self.brief.cards.get(i).map(|c| c.target),
            Focus::Metric(i) => metric_rows(&self.brief.metrics).get(i).map(|r| r.target),
        }
    }

    fn focused(&self) -> Option<Focus> {
        self.focus.and_then(|i| self.focusables().get(i).copied())
    }

    fn move_focus(&mut self, step: isize) {
        let n = self.focusables().len();
        if n == 0 {
            return;
        }
        let next = match self.focus {
            None if step >= 0 => 0,
            None => n - 1,
            Some(i) => (i as isize + step).rem_euclid(n as isize) as usize,
        };
        self.focus = Some(next);
        let target = self.focused().and_then(|f| self.focus_target(f));
        self.store.hover(target, true);
    }

    fn rebuild(&mut self, config: BriefConfig) {
        match build_brief(&config) {
            Ok(brief) => {
                self.status = format!("seed {} | {} days", config.seed, config.days);
                self.brief = brief;
                self.config = config;
            }
            Err(err) => {
                log::warn!("rebuild failed: {err}");
                self.status = format!("Rebuild failed: {err}");
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(9),
                Constraint::Min(12),
                Constraint::Length(3),
            ])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_top(frame, chunks[1]);
        self.draw_charts(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let m = &self.brief.metrics;
        let line = Line::from(vec![
            Span::styled("sm", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(" | Day-ahead market brief"),
            Span::styled(
                format!(
                    " | seed {} | {} days from {} | peak {:.0} €/MWh at {}",
                    self.config.seed,
                    self.config.days,
                    self.config.params.start_date.format("%Y-%m-%d"),
                    m.peak_price,
                    m.peak_label
                ),
                Style::default().fg(Color::Gray),
            ),
        ]);
        frame.render_widget(Paragraph::new(line).block(Block::default().borders(Borders::ALL)), area);
    }

    fn draw_top(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30),
                Constraint::Percentage(30),
                Constraint::Percentage(40),
            ])
            .split(area);

        for (i, card) in self.brief.cards.iter().take(2).enumerate() {
            let focused = self.focused() == Some(Focus::Card(i));
            self.draw_card(frame, chunks[i], card, focused);
        }
        self.draw_metrics(frame, chunks[2]);
    }

    fn draw_card(&self, frame: &mut ratatui::Frame<'_>, area: Rect, card: &InsightCard, focused: bool) {
        let (r, g, b) = hex_rgb(card.severity.stroke()).unwrap_or((200, 200, 200));
        let accent = Color::Rgb(r, g, b);
        let border = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(accent)
        };
        let block = Block::default()
            .title(format!(" {} | {} ", card.title, card.severity.display_name()))
            .borders(Borders::ALL)
            .border_style(border);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(1)])
            .split(inner);

        let text = Text::from(vec![
            Line::from(Span::styled(card.headline.as_str(), Style::default().add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(card.detail.as_str(), Style::default().fg(Color::Gray))),
        ]);
        frame.render_widget(Paragraph::new(text), rows[0]);

        // Sparkline from the card's precomputed geometry (y flipped: canvas y grows upwards).
        let spark = &card.spark;
        let canvas = Canvas::default()
            .x_bounds([0.0, spark.width])
            .y_bounds([0.0, spark.height])
            .paint(|ctx| {
                for pair in spark.points.windows(2) {
                    ctx.draw(&CanvasLine::new(
                        pair[0].x,
                        spark.height - pair[0].y,
                        pair[1].x,
                        spark.height - pair[1].y,
                        accent,
                    ));
                }
                if let Some(peak) = spark.peak {
                    ctx.print(peak.x, spark.height - peak.y, Span::styled("●", Style::default().fg(accent)));
                }
            });
        frame.render_widget(canvas, rows[1]);
    }

    fn draw_metrics(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = metric_rows(&self.brief.metrics);
        let lines: Vec<Line> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let focused = self.focused() == Some(Focus::Metric(i));
                metric_line(row, self.store.emphasis(row.target), focused)
            })
            .collect();

        let p = Paragraph::new(Text::from(lines))
            .block(Block::default().title(" Key Numbers ").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_charts(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);
        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);

        self.draw_price_chart(frame, rows[0]);
        self.draw_volatility_chart(frame, bottom[0]);
        self.draw_driver_chart(frame, bottom[1]);
    }

    fn chart_block(&self, frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, target: HighlightTarget) -> Rect {
        let emphasis = self.store.emphasis(target);
        let block = Block::default()
            .title(format!(" {title} "))
            .borders(Borders::ALL)
            .border_style(border_style(emphasis));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);
        inner
    }

    fn draw_price_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let target = HighlightTarget::Price;
        let inner = self.chart_block(frame, area, "Day-ahead price vs baseline (€/MWh)", target);
        let emphasis = self.store.emphasis(target);

        let window = self.brief.price_window();
        let price: Vec<(f64, f64)> = window.iter().map(|p| (p.index as f64, p.value)).collect();
        let baseline: Vec<(f64, f64)> = window.iter().map(|p| (p.index as f64, p.baseline)).collect();
        let anomalies: Vec<(f64, f64)> = window
            .iter()
            .filter(|p| p.is_anomaly)
            .map(|p| (p.index as f64, p.value))
            .collect();

        let chart = SeriesChart {
            x_bounds: padded_bounds(price.iter().map(|p| p.0), 0.0),
            y_bounds: padded_bounds(price.iter().chain(&baseline).map(|p| p.1), 0.05),
            series: vec![
                ChartSeries { data: &baseline, color: shade(GRAY, emphasis), style: SeriesStyle::Line },
                ChartSeries { data: &price, color: shade(CYAN, emphasis), style: SeriesStyle::Line },
                ChartSeries { data: &anomalies, color: shade(RED, emphasis), style: SeriesStyle::Dots },
            ],
            x_label: "hour",
            y_label: "€/MWh",
            fmt_x: fmt_axis_int,
            fmt_y: fmt_axis_int,
            axis_color: shade(WHITE, emphasis),
        };
        frame.render_widget(chart, inner);
    }

    fn draw_volatility_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let target = HighlightTarget::Volatility;
        let inner = self.chart_block(frame, area, "Volatility regime (%)", target);
        let emphasis = self.store.emphasis(target);

        let vol = &self.brief.volatility;
        let values: Vec<(f64, f64)> = vol.iter().enumerate().map(|(i, v)| (i as f64, v.value)).collect();
        let upper: Vec<(f64, f64)> = vol.iter().enumerate().map(|(i, v)| (i as f64, v.normal_upper)).collect();
        let lower: Vec<(f64, f64)> = vol.iter().enumerate().map(|(i, v)| (i as f64, v.normal_lower)).collect();
        let above: Vec<(f64, f64)> = vol
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_above_normal())
            .map(|(i, v)| (i as f64, v.value))
            .collect();

        let chart = SeriesChart {
            x_bounds: padded_bounds(values.iter().map(|p| p.0), 0.0),
            y_bounds: padded_bounds(values.iter().chain(&upper).chain(&lower).map(|p| p.1), 0.1),
            series: vec![
                ChartSeries { data: &upper, color: shade(GRAY, emphasis), style: SeriesStyle::Line },
                ChartSeries { data: &lower, color: shade(GRAY, emphasis), style: SeriesStyle::Line },
                ChartSeries { data: &values, color: shade(AMBER, emphasis), style: SeriesStyle::Line },
                ChartSeries { data: &above, color: shade(RED, emphasis), style: SeriesStyle::Dots },
            ],
            x_label: "day",
            y_label: "%",
            fmt_x: fmt_axis_int,
            fmt_y: fmt_axis_int,
            axis_color: shade(WHITE, emphasis),
        };
        frame.render_widget(chart, inner);
    }

    fn draw_driver_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let target = HighlightTarget::Driver;
        let stats = &self.brief.driver_stats;
        let title = format!("Residual load vs price (r={:.2})", stats.correlation);
        let inner = self.chart_block(frame, area, &title, target);
        let emphasis = self.store.emphasis(target);

        let (normal, anomalies) = scatter_points(&self.brief.drivers);

        let x_bounds = padded_bounds(self.brief.drivers.iter().map(|s| s.residual_load), 0.05);
        let fit: Vec<(f64, f64)> = x_bounds.iter().map(|&x| (x, stats.predict(x))).collect();

        let chart = SeriesChart {
            x_bounds,
            y_bounds: padded_bounds(normal.iter().chain(&anomalies).chain(&fit).map(|p| p.1), 0.05),
            series: vec![
                ChartSeries { data: &fit, color: shade(GRAY, emphasis), style: SeriesStyle::Line },
                ChartSeries { data: &normal, color: shade(GREEN, emphasis), style: SeriesStyle::Dots },
                ChartSeries { data: &anomalies, color: shade(RED, emphasis), style: SeriesStyle::Dots },
            ],
            x_label: "MW",
            y_label: "€/MWh",
            fmt_x: fmt_axis_int,
            fmt_y: fmt_axis_int,
            axis_color: shade(WHITE, emphasis),
        };
        frame.render_widget(chart, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab/S-Tab focus  1/2/3 highlight  Esc clear  r reseed  +/- days  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        frame.render_widget(Paragraph::new(line).block(Block::default().borders(Borders::ALL)), area);
    }
}

const WHITE: RGBColor = RGBColor(255, 255, 255);
const GRAY: RGBColor = RGBColor(150, 150, 150);
const CYAN: RGBColor = RGBColor(0, 255, 255);
const AMBER: RGBColor = RGBColor(245, 158, 11);
const GREEN: RGBColor = RGBColor(16, 185, 129);
const RED: RGBColor = RGBColor(239, 68, 68);

/// Clicking the active target again clears it.
fn toggle(current: Option<HighlightTarget>, target: HighlightTarget) -> Option<HighlightTarget> {
    if current == Some(target) { None } else { Some(target) }
}

/// Split the driver sample into (normal, anomaly) scatter coordinates.
fn scatter_points(samples: &[CorrelationSample]) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    let (anomalies, normal): (Vec<&CorrelationSample>, Vec<_>) = samples.iter().partition(|s| s.is_anomaly);
    let xy = |s: &&CorrelationSample| (s.residual_load, s.price);
    (normal.iter().map(xy).collect(), anomalies.iter().map(xy).collect())
}

fn border_style(emphasis: Emphasis) -> Style {
    match emphasis {
        Emphasis::Highlighted => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        Emphasis::Faded => Style::default().fg(Color::DarkGray),
        Emphasis::Normal => Style::default(),
    }
}

/// Dim a colour toward the background when its chart is faded.
fn shade(color: RGBColor, emphasis: Emphasis) -> RGBColor {
    match emphasis {
        Emphasis::Faded => {
            let dim = |c: u8| (c as u16 * 35 / 100) as u8;
            RGBColor(dim(color.0), dim(color.1), dim(color.2))
        }
        Emphasis::Highlighted | Emphasis::Normal => color,
    }
}

fn metric_line(row: &MetricRow, emphasis: Emphasis, focused: bool) -> Line<'static> {
    let style = match emphasis {
        Emphasis::Highlighted => Style::default().fg(Color::Cyan),
        Emphasis::Faded => Style::default().fg(Color::DarkGray),
        Emphasis::Normal => Style::default(),
    };
    let style = if focused { style.add_modifier(Modifier::REVERSED) } else { style };
    Line::from(vec![
        Span::styled(format!("{:<30}", row.label), style),
        Span::styled(format!("{:>22}", row.value), style.add_modifier(Modifier::BOLD)),
        Span::styled(format!(" {:>6}", row.change.as_deref().unwrap_or("")), style),
    ])
}

/// Parse `#rrggbb`.
fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Min/max of the values, padded by `frac` of the span; a unit box when empty or flat.
fn padded_bounds(values: impl Iterator<Item = f64>, frac: f64) -> [f64; 2] {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    if hi <= lo {
        return [lo - 0.5, hi + 0.5];
    }
    let pad = (hi - lo) * frac;
    [lo - pad, hi + pad]
}

fn fmt_axis_int(v: f64) -> String {
    format!("{v:.0}")
}
