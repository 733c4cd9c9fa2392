use crate::api::{Sector, SectorDataset, Stock};
use crate::error::ApiError;
use crate::selection::{HeatmapPeriod, Metric};
use crate::treemap::{Bounds, Treemap};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracing::{debug, warn};

/// Leaf weight used when a stock's market cap is unknown.
pub const DEFAULT_WEIGHT: f64 = 1e9;

/// Height of the sector header band, in layout pixels.
pub const HEADER_HEIGHT: f64 = 15.0;

const HEADER_BG: Color = rgb(0x1a1d21);
const HEADER_FG: Color = rgb(0x888888);

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

pub fn weight(stock: &Stock) -> f64 {
    match stock.market_cap {
        Some(cap) if cap > 0.0 => cap,
        _ => DEFAULT_WEIGHT,
    }
}

/// Fill colour of a heatmap cell.
///
/// Percent change uses a nine-colour scale centred on zero. P/E and forward
/// P/E are compared against 20 on a coarser six-colour scale; a missing
/// ratio counts as exactly 20.
pub fn color_for_metric(stock: &Stock, metric: Metric) -> Color {
    match metric {
        Metric::Change => {
            let v = stock.change.unwrap_or(0.0);
            if v >= 3.0 {
                rgb(0x30cc5a)
            } else if v >= 2.0 {
                rgb(0x2f9e4f)
            } else if v >= 1.0 {
                rgb(0x2d8346)
            } else if v >= 0.5 {
                rgb(0x35764e)
            } else if v >= 0.0 {
                rgb(0x414554)
            } else if v >= -0.5 {
                rgb(0x4d3a3e)
            } else if v >= -1.0 {
                rgb(0x8b3e3e)
            } else if v >= -2.0 {
                rgb(0xbf3939)
            } else {
                rgb(0xf23645)
            }
        }
        Metric::Pe | Metric::FwdPe => {
            let v = ratio(stock, metric).unwrap_or(20.0) - 20.0;
            if v < -10.0 {
                rgb(0x30cc5a)
            } else if v < -5.0 {
                rgb(0x2f9e4f)
            } else if v < 0.0 {
                rgb(0x35764e)
            } else if v < 5.0 {
                rgb(0x414554)
            } else if v < 10.0 {
                rgb(0x8b3e3e)
            } else {
                rgb(0xf23645)
            }
        }
    }
}

// A zero ratio means the backend had nothing to report.
fn ratio(stock: &Stock, metric: Metric) -> Option<f64> {
    let value = match metric {
        Metric::Pe => stock.pe,
        Metric::FwdPe => stock.fwd_pe,
        Metric::Change => None,
    };
    value.filter(|v| *v != 0.0)
}

/// Secondary label text for a cell.
pub fn display_value(stock: &Stock, metric: Metric) -> String {
    match metric {
        Metric::Change => format_change(stock.change),
        Metric::Pe | Metric::FwdPe => {
            ratio(stock, metric).map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
        }
    }
}

pub fn format_change(change: Option<f64>) -> String {
    let c = change.unwrap_or(0.0);
    if c >= 0.0 {
        format!("+{c:.2}%")
    } else {
        format!("{c:.2}%")
    }
}

/// Which labels fit in a cell of the given pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelVisibility {
    pub ticker: bool,
    pub value: bool,
}

impl LabelVisibility {
    pub fn for_size(width: f64, height: f64) -> LabelVisibility {
        LabelVisibility {
            ticker: width > 20.0 && height > 15.0,
            value: width >= 30.0 && height >= 35.0,
        }
    }
}

/// Last fetched dataset, keyed by the period it was fetched for.
#[derive(Debug, Default)]
pub struct HeatmapCache {
    entry: Option<(HeatmapPeriod, SectorDataset)>,
}

impl HeatmapCache {
    pub fn get(&self, period: HeatmapPeriod) -> Option<&SectorDataset> {
        match &self.entry {
            Some((p, dataset)) if *p == period => Some(dataset),
            _ => None,
        }
    }

    /// Empty datasets are not worth keeping; returns whether it was stored.
    pub fn store(&mut self, period: HeatmapPeriod, dataset: SectorDataset) -> bool {
        if dataset.is_empty() {
            self.entry = None;
            return false;
        }
        self.entry = Some((period, dataset));
        true
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    fn dataset(&self) -> Option<&SectorDataset> {
        self.entry.as_ref().map(|(_, d)| d)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectorCell {
    pub sector: usize,
    pub bounds: Bounds,
}

impl SectorCell {
    pub fn header(&self) -> Bounds {
        Bounds::new(
            self.bounds.x0,
            self.bounds.y0,
            self.bounds.x1,
            (self.bounds.y0 + HEADER_HEIGHT).min(self.bounds.y1),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeafCell {
    pub sector: usize,
    pub stock: usize,
    pub bounds: Bounds,
    pub color: Color,
    pub labels: LabelVisibility,
    pub value: String,
}

/// Pixel-space heatmap: sector boxes and coloured leaves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeatmapLayout {
    pub sectors: Vec<SectorCell>,
    pub leaves: Vec<LeafCell>,
}

pub fn layout(dataset: &SectorDataset, metric: Metric, width: f64, height: f64) -> HeatmapLayout {
    let weights: Vec<Vec<f64>> = dataset
        .sectors
        .iter()
        .map(|s| s.stocks.iter().map(weight).collect())
        .collect();

    let mut result = HeatmapLayout::default();
    for group in Treemap::new(width, height).layout(&weights) {
        let sector = &dataset.sectors[group.index];
        result.sectors.push(SectorCell {
            sector: group.index,
            bounds: group.bounds,
        });
        for leaf in group.leaves {
            let stock = &sector.stocks[leaf.index];
            result.leaves.push(LeafCell {
                sector: group.index,
                stock: leaf.index,
                bounds: leaf.bounds,
                color: color_for_metric(stock, metric),
                labels: LabelVisibility::for_size(leaf.bounds.width(), leaf.bounds.height()),
                value: display_value(stock, metric),
            });
        }
    }
    result
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Leaf { sector: usize, stock: usize },
    SectorHeader(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatmapStatus {
    Idle,
    Loading,
    Ready,
    Empty,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Layout computed for a specific terminal area.
#[derive(Debug)]
struct Rendered {
    area: Rect,
    metric: Metric,
    layout: HeatmapLayout,
}

pub struct HeatmapView {
    cache: HeatmapCache,
    metric: Metric,
    status: HeatmapStatus,
    cell_width_px: u16,
    cell_height_px: u16,
    rendered: Option<Rendered>,
    cursor: usize,
}

impl HeatmapView {
    pub fn new(metric: Metric, cell_width_px: u16, cell_height_px: u16) -> HeatmapView {
        HeatmapView {
            cache: HeatmapCache::default(),
            metric,
            status: HeatmapStatus::Idle,
            cell_width_px: cell_width_px.max(1),
            cell_height_px: cell_height_px.max(1),
            rendered: None,
            cursor: 0,
        }
    }

    pub fn status(&self) -> HeatmapStatus {
        self.status
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn dataset(&self) -> Option<&SectorDataset> {
        self.cache.dataset()
    }

    /// Start showing `period`. Returns the period to fetch, or `None` when
    /// the cache already holds it.
    pub fn begin_load(&mut self, period: HeatmapPeriod) -> Option<HeatmapPeriod> {
        if self.cache.get(period).is_some() {
            self.status = HeatmapStatus::Ready;
            self.rendered = None;
            return None;
        }
        self.status = HeatmapStatus::Loading;
        Some(period)
    }

    pub fn invalidate(&mut self) {
        self.cache.invalidate();
        self.rendered = None;
        self.cursor = 0;
        self.status = HeatmapStatus::Idle;
    }

    /// Redraw from the cached dataset with a new metric. Never re-fetches.
    pub fn set_metric(&mut self, metric: Metric) {
        self.metric = metric;
        self.rendered = None;
    }

    /// Accept a fetch result for `period`. Results for anything but the
    /// `current` period arrived too late and are dropped.
    pub fn apply(
        &mut self,
        period: HeatmapPeriod,
        current: HeatmapPeriod,
        result: Result<SectorDataset, ApiError>,
    ) -> bool {
        if period != current {
            debug!(%period, %current, "dropping stale heatmap response");
            return false;
        }
        match result {
            Ok(dataset) => {
                if self.cache.store(period, dataset) {
                    self.status = HeatmapStatus::Ready;
                } else {
                    self.status = HeatmapStatus::Empty;
                }
            }
            Err(e) => {
                warn!(error = %e, %period, "failed to load heatmap");
                self.cache.invalidate();
                self.status = HeatmapStatus::Failed;
            }
        }
        self.rendered = None;
        self.cursor = 0;
        true
    }

    pub fn sector(&self, index: usize) -> Option<&Sector> {
        self.dataset()?.sectors.get(index)
    }

    pub fn stock(&self, sector: usize, stock: usize) -> Option<&Stock> {
        self.sector(sector)?.stocks.get(stock)
    }

    /// Leaf under the keyboard cursor
    pub fn focused(&self) -> Option<HitTarget> {
        let leaf = self.rendered.as_ref()?.layout.leaves.get(self.cursor)?;
        Some(HitTarget::Leaf {
            sector: leaf.sector,
            stock: leaf.stock,
        })
    }

    /// Move the cursor to the closest leaf whose centre lies in `direction`.
    pub fn move_cursor(&mut self, direction: Direction) {
        let Some(rendered) = &self.rendered else {
            return;
        };
        let leaves = &rendered.layout.leaves;
        let Some(current) = leaves.get(self.cursor) else {
            return;
        };
        let (cx, cy) = current.bounds.center();

        let best = leaves
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != self.cursor)
            .filter_map(|(i, leaf)| {
                let (x, y) = leaf.bounds.center();
                let (along, across) = match direction {
                    Direction::Right => (x - cx, y - cy),
                    Direction::Left => (cx - x, y - cy),
                    Direction::Down => (y - cy, x - cx),
                    Direction::Up => (cy - y, x - cx),
                };
                // sideways drift costs more than forward distance
                (along > 0.0).then(|| (i, along + across.abs() * 2.0))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((i, _)) = best {
            self.cursor = i;
        }
    }

    /// Map a terminal cell to whatever is drawn there.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<HitTarget> {
        let rendered = self.rendered.as_ref()?;
        let area = rendered.area;
        if column < area.x || row < area.y || column >= area.right() || row >= area.bottom() {
            return None;
        }
        // sample the middle of the cell
        let x = (f64::from(column - area.x) + 0.5) * f64::from(self.cell_width_px);
        let y = (f64::from(row - area.y) + 0.5) * f64::from(self.cell_height_px);

        if let Some(leaf) = rendered.layout.leaves.iter().find(|l| l.bounds.contains(x, y)) {
            return Some(HitTarget::Leaf {
                sector: leaf.sector,
                stock: leaf.stock,
            });
        }
        rendered
            .layout
            .sectors
            .iter()
            .find(|s| s.header().contains(x, y))
            .map(|s| HitTarget::SectorHeader(s.sector))
    }

    fn ensure_layout(&mut self, area: Rect) {
        let up_to_date = self
            .rendered
            .as_ref()
            .is_some_and(|r| r.area == area && r.metric == self.metric);
        if up_to_date {
            return;
        }
        let Some(dataset) = self.cache.dataset() else {
            self.rendered = None;
            return;
        };
        let width = f64::from(area.width) * f64::from(self.cell_width_px);
        let height = f64::from(area.height) * f64::from(self.cell_height_px);
        let layout = layout(dataset, self.metric, width, height);
        if self.cursor >= layout.leaves.len() {
            self.cursor = 0;
        }
        self.rendered = Some(Rendered {
            area,
            metric: self.metric,
            layout,
        });
    }

    fn to_cells(&self, area: Rect, b: &Bounds) -> Rect {
        let cw = f64::from(self.cell_width_px);
        let ch = f64::from(self.cell_height_px);
        let x0 = (b.x0 / cw).round() as u16;
        let x1 = (b.x1 / cw).round() as u16;
        let y0 = (b.y0 / ch).round() as u16;
        let y1 = (b.y1 / ch).round() as u16;
        Rect::new(
            area.x + x0.min(area.width),
            area.y + y0.min(area.height),
            x1.saturating_sub(x0).min(area.width.saturating_sub(x0)),
            y1.saturating_sub(y0).min(area.height.saturating_sub(y0)),
        )
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let placeholder = match self.status {
            HeatmapStatus::Idle | HeatmapStatus::Loading => Some("Loading S&P 500 heatmap..."),
            HeatmapStatus::Empty => Some("No data"),
            HeatmapStatus::Failed => Some("Error loading heatmap"),
            HeatmapStatus::Ready => None,
        };
        if let Some(text) = placeholder {
            let paragraph = Paragraph::new(text)
                .block(Block::default().borders(Borders::ALL).title("Heatmap"))
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center);
            f.render_widget(paragraph, area);
            return;
        }

        self.ensure_layout(area);
        let Some(rendered) = &self.rendered else {
            return;
        };
        let Some(dataset) = self.cache.dataset() else {
            return;
        };

        let buf = f.buffer_mut();
        for sector in &rendered.layout.sectors {
            let header = self.to_cells(area, &sector.header());
            if header.width == 0 || header.height == 0 {
                continue;
            }
            let header = Rect { height: 1, ..header };
            buf.set_style(header, Style::default().bg(HEADER_BG));
            let name = dataset.sectors[sector.sector].name.to_uppercase();
            buf.set_stringn(
                header.x + 1,
                header.y,
                &name,
                usize::from(header.width.saturating_sub(1)),
                Style::default()
                    .fg(HEADER_FG)
                    .bg(HEADER_BG)
                    .add_modifier(Modifier::BOLD),
            );
        }

        for (i, leaf) in rendered.layout.leaves.iter().enumerate() {
            let cells = self.to_cells(area, &leaf.bounds);
            if cells.width == 0 || cells.height == 0 {
                continue;
            }
            buf.set_style(cells, Style::default().bg(leaf.color));

            let mut label_style = Style::default()
                .fg(Color::White)
                .bg(leaf.color)
                .add_modifier(Modifier::BOLD);
            if i == self.cursor {
                label_style = label_style
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::UNDERLINED);
            }

            let ticker = &dataset.sectors[leaf.sector].stocks[leaf.stock].ticker;
            if leaf.labels.ticker {
                let (ticker_row, value_row) = if leaf.labels.value && cells.height >= 2 {
                    let top = cells.y + (cells.height - 2) / 2;
                    (top, Some(top + 1))
                } else {
                    (cells.y + (cells.height - 1) / 2, None)
                };
                put_centered(buf, cells, ticker_row, ticker, label_style);
                if let Some(row) = value_row {
                    let value_style = Style::default().fg(Color::White).bg(leaf.color);
                    put_centered(buf, cells, row, &leaf.value, value_style);
                }
            } else if i == self.cursor {
                // too small for text, still show where the cursor is
                buf.set_style(cells, Style::default().bg(leaf.color).add_modifier(Modifier::REVERSED));
            }
        }
    }
}

fn put_centered(buf: &mut ratatui::buffer::Buffer, cells: Rect, row: u16, text: &str, style: Style) {
    let width = text.chars().count() as u16;
    if width > cells.width {
        return;
    }
    let x = cells.x + (cells.width - width) / 2;
    buf.set_string(x, row, text, style);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn stock(ticker: &str, change: Option<f64>, cap: Option<f64>) -> Stock {
        Stock {
            ticker: ticker.to_string(),
            price: Some(100.0),
            change,
            market_cap: cap,
            pe: None,
            fwd_pe: None,
        }
    }

    fn valuation(pe: Option<f64>, fwd_pe: Option<f64>) -> Stock {
        Stock {
            pe,
            fwd_pe,
            ..stock("X", None, None)
        }
    }

    fn dataset() -> SectorDataset {
        SectorDataset {
            sectors: vec![
                Sector {
                    name: "Technology".to_string(),
                    stocks: vec![
                        stock("AAPL", Some(1.2), Some(3.0e12)),
                        stock("MSFT", Some(-0.7), Some(2.8e12)),
                        stock("TINY", Some(5.0), None),
                    ],
                },
                Sector {
                    name: "Energy".to_string(),
                    stocks: vec![stock("XOM", Some(-3.0), Some(4.0e11))],
                },
            ],
        }
    }

    #[test]
    fn test_change_scale_extremes() {
        let deepest_green = rgb(0x30cc5a);
        let deepest_red = rgb(0xf23645);
        assert_eq!(color_for_metric(&stock("A", Some(5.0), None), Metric::Change), deepest_green);
        assert_eq!(color_for_metric(&stock("A", Some(3.5), None), Metric::Change), deepest_green);
        assert_eq!(color_for_metric(&stock("A", Some(3.0), None), Metric::Change), deepest_green);
        assert_eq!(color_for_metric(&stock("A", Some(-3.0), None), Metric::Change), deepest_red);
        assert_eq!(color_for_metric(&stock("A", Some(-2.0), None), Metric::Change), rgb(0xbf3939));
    }

    #[test]
    fn test_change_scale_steps() {
        let cases = [
            (2.5, 0x2f9e4f),
            (1.0, 0x2d8346),
            (0.7, 0x35764e),
            (0.0, 0x414554),
            (-0.3, 0x4d3a3e),
            (-0.9, 0x8b3e3e),
            (-1.5, 0xbf3939),
        ];
        for (change, hex) in cases {
            assert_eq!(
                color_for_metric(&stock("A", Some(change), None), Metric::Change),
                rgb(hex),
                "change {change}"
            );
        }
        // missing change is treated as flat
        assert_eq!(color_for_metric(&stock("A", None, None), Metric::Change), rgb(0x414554));
    }

    #[test]
    fn test_valuation_scale() {
        assert_eq!(color_for_metric(&valuation(Some(5.0), None), Metric::Pe), rgb(0x30cc5a));
        assert_eq!(color_for_metric(&valuation(Some(12.0), None), Metric::Pe), rgb(0x2f9e4f));
        assert_eq!(color_for_metric(&valuation(Some(18.0), None), Metric::Pe), rgb(0x35764e));
        assert_eq!(color_for_metric(&valuation(Some(20.0), None), Metric::Pe), rgb(0x414554));
        assert_eq!(color_for_metric(&valuation(Some(27.0), None), Metric::Pe), rgb(0x8b3e3e));
        assert_eq!(color_for_metric(&valuation(Some(45.0), None), Metric::Pe), rgb(0xf23645));
        // fwdPe reads its own field and treats missing as 20
        assert_eq!(color_for_metric(&valuation(Some(5.0), None), Metric::FwdPe), rgb(0x414554));
        assert_eq!(color_for_metric(&valuation(None, Some(5.0)), Metric::FwdPe), rgb(0x30cc5a));
    }

    #[test]
    fn test_zero_ratio_counts_as_missing() {
        let zero = valuation(Some(0.0), Some(0.0));
        assert_eq!(color_for_metric(&zero, Metric::Pe), rgb(0x414554));
        assert_eq!(color_for_metric(&zero, Metric::FwdPe), rgb(0x414554));
        assert_eq!(display_value(&zero, Metric::Pe), "-");
        assert_eq!(display_value(&zero, Metric::FwdPe), "-");
    }

    #[test]
    fn test_color_is_deterministic() {
        let s = stock("AAPL", Some(0.8), Some(1.0));
        for metric in Metric::all() {
            assert_eq!(color_for_metric(&s, *metric), color_for_metric(&s, *metric));
        }
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&stock("A", Some(1.234), None), Metric::Change), "+1.23%");
        assert_eq!(display_value(&stock("A", Some(-0.5), None), Metric::Change), "-0.50%");
        assert_eq!(display_value(&valuation(Some(31.26), None), Metric::Pe), "31.3");
        assert_eq!(display_value(&valuation(None, None), Metric::FwdPe), "-");
    }

    #[test]
    fn test_label_visibility() {
        assert_eq!(
            LabelVisibility::for_size(15.0, 10.0),
            LabelVisibility { ticker: false, value: false }
        );
        assert_eq!(
            LabelVisibility::for_size(40.0, 40.0),
            LabelVisibility { ticker: true, value: true }
        );
        // boundaries: ticker needs > 20 x > 15, value needs >= 30 x >= 35
        assert!(!LabelVisibility::for_size(20.0, 40.0).ticker);
        assert!(!LabelVisibility::for_size(40.0, 15.0).ticker);
        assert!(LabelVisibility::for_size(30.0, 35.0).value);
        assert!(!LabelVisibility::for_size(29.0, 40.0).value);
        assert!(!LabelVisibility::for_size(40.0, 34.0).value);
    }

    #[test]
    fn test_weight_falls_back_for_unknown_cap() {
        assert_eq!(weight(&stock("A", None, None)), DEFAULT_WEIGHT);
        assert_eq!(weight(&stock("A", None, Some(0.0))), DEFAULT_WEIGHT);
        assert_eq!(weight(&stock("A", None, Some(5.0e11))), 5.0e11);
    }

    #[test]
    fn test_cache_is_keyed_by_period() {
        let mut cache = HeatmapCache::default();
        assert!(cache.store(HeatmapPeriod::OneDay, dataset()));
        assert!(cache.get(HeatmapPeriod::OneDay).is_some());
        assert!(cache.get(HeatmapPeriod::OneWeek).is_none());
        assert!(!cache.store(HeatmapPeriod::OneWeek, SectorDataset::default()));
        assert!(cache.get(HeatmapPeriod::OneDay).is_none());
    }

    #[test]
    fn test_layout_covers_every_stock() {
        let layout = layout(&dataset(), Metric::Change, 800.0, 600.0);
        assert_eq!(layout.sectors.len(), 2);
        assert_eq!(layout.leaves.len(), 4);
        // technology is heavier so it comes first
        assert_eq!(layout.sectors[0].sector, 0);
        let tiny = layout.leaves.iter().find(|l| l.stock == 2 && l.sector == 0).unwrap();
        assert_eq!(tiny.value, "+5.00%");
        assert!(!tiny.labels.ticker, "a 1e9 sliver next to trillions should be unlabeled");
    }

    #[test]
    fn test_metric_change_reuses_cache() {
        let mut view = HeatmapView::new(Metric::Change, 8, 16);
        assert_eq!(view.begin_load(HeatmapPeriod::OneDay), Some(HeatmapPeriod::OneDay));
        view.apply(HeatmapPeriod::OneDay, HeatmapPeriod::OneDay, Ok(dataset()));
        assert_eq!(view.status(), HeatmapStatus::Ready);

        view.set_metric(Metric::Pe);
        assert!(view.dataset().is_some());
        assert_eq!(view.begin_load(HeatmapPeriod::OneDay), None);

        view.invalidate();
        assert!(view.dataset().is_none());
        assert_eq!(view.begin_load(HeatmapPeriod::OneDay), Some(HeatmapPeriod::OneDay));
    }

    #[test]
    fn test_stale_and_failed_results() {
        let mut view = HeatmapView::new(Metric::Change, 8, 16);
        view.begin_load(HeatmapPeriod::OneWeek);
        assert!(!view.apply(HeatmapPeriod::OneDay, HeatmapPeriod::OneWeek, Ok(dataset())));
        assert!(view.dataset().is_none());

        view.apply(
            HeatmapPeriod::OneWeek,
            HeatmapPeriod::OneWeek,
            Err(ApiError::Network("timeout".into())),
        );
        assert_eq!(view.status(), HeatmapStatus::Failed);

        view.apply(HeatmapPeriod::OneWeek, HeatmapPeriod::OneWeek, Ok(SectorDataset::default()));
        assert_eq!(view.status(), HeatmapStatus::Empty);
    }

    #[test]
    fn test_render_and_hit_test() {
        let mut view = HeatmapView::new(Metric::Change, 8, 16);
        view.begin_load(HeatmapPeriod::OneDay);
        view.apply(HeatmapPeriod::OneDay, HeatmapPeriod::OneDay, Ok(dataset()));

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                view.render(f, area);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("TECHNOLOGY"));
        assert!(text.contains("AAPL"));

        // top-left corner is the first sector's header band
        assert_eq!(view.hit_test(1, 0), Some(HitTarget::SectorHeader(0)));
        assert!(matches!(view.hit_test(5, 5), Some(HitTarget::Leaf { sector: 0, .. })));
        assert_eq!(view.hit_test(200, 5), None);
        assert_eq!(view.focused(), Some(HitTarget::Leaf { sector: 0, stock: 0 }));
    }

    #[test]
    fn test_cursor_moves_between_leaves() {
        let mut view = HeatmapView::new(Metric::Change, 8, 16);
        view.begin_load(HeatmapPeriod::OneDay);
        view.apply(HeatmapPeriod::OneDay, HeatmapPeriod::OneDay, Ok(dataset()));
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                view.render(f, area);
            })
            .unwrap();

        assert_eq!(view.focused(), Some(HitTarget::Leaf { sector: 0, stock: 0 }));
        view.move_cursor(Direction::Right);
        assert_eq!(view.focused(), Some(HitTarget::Leaf { sector: 0, stock: 1 }));
        view.move_cursor(Direction::Left);
        assert_eq!(view.focused(), Some(HitTarget::Leaf { sector: 0, stock: 0 }));
        // nothing further left, the cursor stays put
        view.move_cursor(Direction::Left);
        assert_eq!(view.focused(), Some(HitTarget::Leaf { sector: 0, stock: 0 }));
    }

    #[test]
    fn test_placeholder_when_loading() {
        let mut view = HeatmapView::new(Metric::Change, 8, 16);
        view.begin_load(HeatmapPeriod::OneDay);
        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                view.render(f, area);
            })
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Loading"));
        assert_eq!(view.hit_test(5, 5), None);
    }
}
