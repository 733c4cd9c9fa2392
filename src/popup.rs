use crate::api::Stock;
use crate::error::ValidationError;
use crate::heatmap::format_change;
use crate::selection::SelectionState;
use ratatui::{
    layout::{Alignment, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tracing::debug;

const DETAIL_WIDTH: u16 = 40;
const DETAIL_HEIGHT: u16 = 11;
const LIST_WIDTH: u16 = 56;

/// Formats a market cap the way the detail card shows it.
pub fn format_market_cap(cap: Option<f64>) -> String {
    match cap {
        Some(cap) if cap >= 1e12 => format!("${:.2}T", cap / 1e12),
        Some(cap) if cap >= 1e9 => format!("${:.1}B", cap / 1e9),
        Some(cap) if cap > 0.0 => format!("${:.0}M", cap / 1e6),
        _ => "N/A".to_string(),
    }
}

fn format_ratio(value: Option<f64>) -> String {
    match value {
        Some(v) if v != 0.0 => format!("{v:.1}"),
        _ => "N/A".to_string(),
    }
}

fn format_price(price: Option<f64>) -> String {
    price.map_or_else(|| "N/A".to_string(), |p| format!("${p:.2}"))
}

fn change_color(change: Option<f64>) -> Color {
    if change.unwrap_or(0.0) >= 0.0 {
        Color::Green
    } else {
        Color::Red
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    StockDetail(Stock),
    SectorList {
        sector: String,
        stocks: Vec<Stock>,
        selected: usize,
    },
}

impl Overlay {
    /// Ticker that "send to chart" would add.
    pub fn target_ticker(&self) -> Option<&str> {
        match self {
            Overlay::StockDetail(stock) => Some(&stock.ticker),
            Overlay::SectorList {
                stocks, selected, ..
            } => stocks.get(*selected).map(|s| s.ticker.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// No overlay, or the overlay is not armed yet.
    Ignored,
    Dismissed,
    Inside,
    /// A sector list row was clicked and is now highlighted.
    Row(usize),
}

#[derive(Debug, PartialEq, Eq)]
pub struct PopupOutcome {
    pub ticker: String,
    pub added: Result<bool, ValidationError>,
}

#[derive(Debug, Default)]
pub struct PopupController {
    overlay: Option<Overlay>,
    armed: bool,
    area: Option<Rect>,
    list_offset: usize,
}

impl PopupController {
    pub fn new() -> PopupController {
        PopupController::default()
    }

    #[cfg(test)]
    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.overlay.is_some()
    }

    #[cfg(test)]
    pub fn area(&self) -> Option<Rect> {
        self.area
    }

    pub fn open_detail(&mut self, stock: Stock) {
        debug!(ticker = %stock.ticker, "opening stock detail");
        self.open(Overlay::StockDetail(stock));
    }

    pub fn open_sector_list(&mut self, sector: String, stocks: Vec<Stock>) {
        debug!(%sector, stocks = stocks.len(), "opening sector list");
        self.open(Overlay::SectorList {
            sector,
            stocks,
            selected: 0,
        });
    }

    fn open(&mut self, overlay: Overlay) {
        self.overlay = Some(overlay);
        self.armed = false;
        self.area = None;
        self.list_offset = 0;
    }

    pub fn close(&mut self) {
        self.overlay = None;
        self.armed = false;
        self.area = None;
    }

    /// Called once per event-loop iteration. Outside clicks only dismiss
    /// after the overlay has survived one tick.
    pub fn tick(&mut self) {
        if self.overlay.is_some() {
            self.armed = true;
        }
    }

    pub fn handle_click(&mut self, column: u16, row: u16) -> ClickOutcome {
        if self.overlay.is_none() || !self.armed {
            return ClickOutcome::Ignored;
        }
        let inside = self
            .area
            .is_some_and(|area| area.contains(Position::new(column, row)));
        if !inside {
            self.close();
            return ClickOutcome::Dismissed;
        }

        let (Some(area), Some(Overlay::SectorList { stocks, selected, .. })) =
            (self.area, self.overlay.as_mut())
        else {
            return ClickOutcome::Inside;
        };
        // border, then the column header
        let first_row = area.y + 2;
        let last_row = area.bottom().saturating_sub(1);
        if row < first_row || row >= last_row {
            return ClickOutcome::Inside;
        }
        let index = self.list_offset + (row - first_row) as usize;
        if index >= stocks.len() {
            return ClickOutcome::Inside;
        }
        *selected = index;
        ClickOutcome::Row(index)
    }

    pub fn select_next(&mut self) {
        if let Some(Overlay::SectorList {
            stocks, selected, ..
        }) = &mut self.overlay
        {
            if *selected + 1 < stocks.len() {
                *selected += 1;
            }
        }
    }

    pub fn select_prev(&mut self) {
        if let Some(Overlay::SectorList { selected, .. }) = &mut self.overlay {
            *selected = selected.saturating_sub(1);
        }
    }

    /// Add the shown or highlighted ticker to the chart selection and close
    /// the overlay. The caller switches to the chart tab.
    pub fn send_to_chart(&mut self, state: &mut SelectionState) -> Option<PopupOutcome> {
        let ticker = self.overlay.as_ref()?.target_ticker()?.to_string();
        let added = state.add_ticker(&ticker);
        self.close();
        debug!(%ticker, ?added, "sent to chart");
        Some(PopupOutcome { ticker, added })
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let Some(overlay) = &self.overlay else {
            return;
        };
        match overlay {
            Overlay::StockDetail(stock) => {
                let rect = centered(DETAIL_WIDTH, DETAIL_HEIGHT, area);
                f.render_widget(Clear, rect);
                f.render_widget(detail_card(stock), rect);
                self.area = Some(rect);
            }
            Overlay::SectorList {
                sector,
                stocks,
                selected,
            } => {
                let height = (stocks.len() as u16).saturating_add(4);
                let rect = centered(LIST_WIDTH, height, area);
                let visible = rect.height.saturating_sub(4).max(1) as usize;
                if *selected < self.list_offset {
                    self.list_offset = *selected;
                } else if *selected >= self.list_offset + visible {
                    self.list_offset = *selected + 1 - visible;
                }

                f.render_widget(Clear, rect);
                f.render_widget(
                    sector_list(sector, stocks, *selected, self.list_offset, visible),
                    rect,
                );
                self.area = Some(rect);
            }
        }
    }
}

fn centered(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn detail_row(label: &str, value: String, style: Style) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {label:<12}"), Style::default().fg(Color::Gray)),
        Span::styled(value, style),
    ])
}

fn detail_card(stock: &Stock) -> Paragraph<'static> {
    let plain = Style::default().fg(Color::White);
    let lines = vec![
        detail_row("Price", format_price(stock.price), plain),
        detail_row(
            "Change",
            format_change(stock.change),
            Style::default().fg(change_color(stock.change)),
        ),
        detail_row("Market Cap", format_market_cap(stock.market_cap), plain),
        detail_row("P/E", format_ratio(stock.pe), plain),
        detail_row("Fwd P/E", format_ratio(stock.fwd_pe), plain),
        Line::from(""),
        Line::from(Span::styled(
            "[c] add to chart   [x] close",
            Style::default().fg(Color::Cyan),
        ))
        .alignment(Alignment::Center),
    ];

    Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {} ", stock.ticker))
            .title_style(Style::default().add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black)),
    )
}

fn sector_list<'a>(
    sector: &str,
    stocks: &'a [Stock],
    selected: usize,
    offset: usize,
    visible: usize,
) -> Paragraph<'a> {
    let mut lines = vec![Line::from(Span::styled(
        format!("{:<10}{:>12}{:>12}{:>14}", "Ticker", "Price", "Change", "Market Cap"),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))];

    for (i, stock) in stocks.iter().enumerate().skip(offset).take(visible) {
        let mut style = Style::default().fg(Color::White);
        if i == selected {
            style = style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::from(vec![
            Span::styled(format!("{:<10}", stock.ticker), style),
            Span::styled(format!("{:>12}", format_price(stock.price)), style),
            Span::styled(
                format!("{:>12}", format_change(stock.change)),
                style.fg(change_color(stock.change)),
            ),
            Span::styled(format!("{:>14}", format_market_cap(stock.market_cap)), style),
        ]));
    }

    Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {sector} "))
            .title_bottom(Line::from(" ↑↓ select · c add to chart · x close ").centered())
            .style(Style::default().bg(Color::Black)),
    )
}
