use crate::api::{CompareRequest, CompareResponse, StockSeries};
use crate::error::ApiError;
use crate::selection::SelectionState;
use chrono::DateTime;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};
use tracing::{debug, info, warn};

/// Line colours, assigned by position in the ticker list.
pub const PALETTE: [Color; 6] = [
    Color::Rgb(0x31, 0x82, 0xF6),
    Color::Rgb(0x00, 0xC8, 0x53),
    Color::Rgb(0xFF, 0x52, 0x52),
    Color::Rgb(0xFF, 0x98, 0x00),
    Color::Rgb(0x9C, 0x27, 0xB0),
    Color::Rgb(0x00, 0xBC, 0xD4),
];

pub fn series_color(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub ticker: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub color: Color,
    pub return_pct: Option<f64>,
}

impl LegendEntry {
    pub fn is_up(&self) -> bool {
        self.return_pct.unwrap_or(0.0) >= 0.0
    }

    pub fn return_label(&self) -> String {
        match self.return_pct {
            Some(r) if r >= 0.0 => format!("+{r:.2}%"),
            Some(r) => format!("{r:.2}%"),
            None => "-".to_string(),
        }
    }
}

/// One drawn line
#[derive(Debug, Clone, PartialEq)]
pub struct Line2D {
    pub ticker: String,
    pub color: Color,
    pub points: Vec<(f64, f64)>,
}

/// Visible data range of the chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: [f64; 2],
    pub y: [f64; 2],
}

impl Viewport {
    /// Smallest range that shows every point, with a little headroom on y.
    pub fn fit(lines: &[Line2D]) -> Option<Viewport> {
        let mut points = lines.iter().flat_map(|l| l.points.iter());
        let &(x, y) = points.next()?;
        let (mut x0, mut x1, mut y0, mut y1) = (x, x, y, y);
        for &(x, y) in points {
            x0 = x0.min(x);
            x1 = x1.max(x);
            y0 = y0.min(y);
            y1 = y1.max(y);
        }
        if x1 <= x0 {
            x0 -= 1.0;
            x1 += 1.0;
        }
        let pad = if y1 > y0 { (y1 - y0) * 0.05 } else { 1.0 };
        Some(Viewport {
            x: [x0, x1],
            y: [y0 - pad, y1 + pad],
        })
    }
}

/// A request in flight. Responses are only accepted for the newest ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub request: CompareRequest,
}

#[derive(Debug, Default)]
pub struct ChartView {
    lines: Vec<Line2D>,
    legend: Vec<LegendEntry>,
    viewport: Option<Viewport>,
    loading: bool,
    requested: bool,
    generation: u64,
}

impl ChartView {
    pub fn new() -> ChartView {
        ChartView::default()
    }

    #[cfg(test)]
    pub fn lines(&self) -> &[Line2D] {
        &self.lines
    }

    #[cfg(test)]
    pub fn legend(&self) -> &[LegendEntry] {
        &self.legend
    }

    #[cfg(test)]
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    #[cfg(test)]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Prepare a fetch for the current selection. With no tickers the chart
    /// is cleared and nothing needs fetching.
    pub fn begin_refresh(&mut self, state: &SelectionState) -> Option<Ticket> {
        self.generation += 1;
        let Some(request) = CompareRequest::from_selection(state) else {
            self.clear();
            self.loading = false;
            self.requested = false;
            return None;
        };
        self.loading = true;
        self.requested = true;
        debug!(generation = self.generation, query = %request.query(), "chart refresh");
        Some(Ticket {
            generation: self.generation,
            request,
        })
    }

    /// Returns whether the response replaced what is on screen.
    pub fn apply(&mut self, ticket: &Ticket, result: Result<CompareResponse, ApiError>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                generation = ticket.generation,
                latest = self.generation,
                "dropping stale chart response"
            );
            return false;
        }
        self.loading = false;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, query = %ticket.request.query(), "chart refresh failed");
                return false;
            }
        };
        if let Some(error) = response.error {
            warn!(%error, "chart refresh rejected by backend");
            return false;
        }

        self.replace(&ticket.request, response.stocks);
        info!(series = self.lines.len(), "chart updated");
        true
    }

    #[cfg(test)]
    pub async fn refresh<M: crate::api::MarketData>(
        &mut self,
        state: &SelectionState,
        provider: &M,
    ) -> bool {
        let Some(ticket) = self.begin_refresh(state) else {
            return false;
        };
        let result = provider.compare(&ticket.request).await;
        self.apply(&ticket, result)
    }

    fn clear(&mut self) {
        self.lines.clear();
        self.legend.clear();
        self.viewport = None;
    }

    // remove everything, then add everything. Colours follow the requested
    // ticker order, not the reply order.
    fn replace(&mut self, request: &CompareRequest, stocks: Vec<StockSeries>) {
        self.clear();
        for (i, stock) in stocks.into_iter().enumerate() {
            let index = request
                .tickers
                .iter()
                .position(|t| t.as_str().eq_ignore_ascii_case(&stock.ticker))
                .unwrap_or(i);
            let color = series_color(index);
            self.legend.push(LegendEntry {
                ticker: stock.ticker.clone(),
                name: stock.name,
                price: stock.price,
                color,
                return_pct: stock.return_pct,
            });
            self.lines.push(Line2D {
                ticker: stock.ticker,
                color,
                points: stock
                    .data
                    .iter()
                    .map(|p| (p.time as f64, p.value))
                    .collect(),
            });
        }
        self.viewport = Viewport::fit(&self.lines);
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(area);

        let title = if self.loading {
            "Comparison (loading...)"
        } else {
            "Comparison"
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        match self.viewport {
            Some(viewport) => {
                let datasets: Vec<Dataset> = self
                    .lines
                    .iter()
                    .map(|line| {
                        Dataset::default()
                            .name(line.ticker.clone())
                            .marker(symbols::Marker::Braille)
                            .graph_type(GraphType::Line)
                            .style(Style::default().fg(line.color))
                            .data(&line.points)
                    })
                    .collect();

                let chart = Chart::new(datasets)
                    .block(block)
                    .legend_position(None)
                    .x_axis(
                        Axis::default()
                            .style(Style::default().fg(Color::Gray))
                            .bounds(viewport.x)
                            .labels(time_labels(viewport.x)),
                    )
                    .y_axis(
                        Axis::default()
                            .style(Style::default().fg(Color::Gray))
                            .bounds(viewport.y)
                            .labels(vec![
                                format!("{:.1}", viewport.y[0]),
                                format!("{:.1}", (viewport.y[0] + viewport.y[1]) / 2.0),
                                format!("{:.1}", viewport.y[1]),
                            ]),
                    );
                f.render_widget(chart, chunks[0]);
            }
            None => {
                let text = if self.loading {
                    "Loading chart data..."
                } else if self.requested {
                    "No data for the selected tickers"
                } else {
                    "Add a ticker to start comparing"
                };
                let placeholder = Paragraph::new(text)
                    .block(block)
                    .style(Style::default().fg(Color::Gray))
                    .alignment(Alignment::Center);
                f.render_widget(placeholder, chunks[0]);
            }
        }

        f.render_widget(self.legend_widget(), chunks[1]);
    }

    fn legend_widget(&self) -> Paragraph<'_> {
        let mut spans = Vec::new();
        for entry in &self.legend {
            let value_color = if entry.is_up() { Color::Green } else { Color::Red };
            spans.push(Span::styled("● ", Style::default().fg(entry.color)));
            spans.push(Span::styled(
                entry.ticker.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
            if let Some(price) = entry.price {
                spans.push(Span::styled(
                    format!(" ${price:.2}"),
                    Style::default().fg(Color::Gray),
                ));
            }
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                entry.return_label(),
                Style::default().fg(value_color),
            ));
            spans.push(Span::raw("   "));
        }
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL).title("Legend"))
    }
}

fn time_labels(bounds: [f64; 2]) -> Vec<String> {
    // intraday ranges read better with a clock
    let format = if bounds[1] - bounds[0] < 2.0 * 86_400.0 {
        "%m-%d %H:%M"
    } else {
        "%Y-%m-%d"
    };
    bounds
        .iter()
        .map(|&t| {
            DateTime::from_timestamp(t as i64, 0)
                .map(|dt| dt.format(format).to_string())
                .unwrap_or_default()
        })
        .collect()
}
