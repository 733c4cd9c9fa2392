use crate::error::ValidationError;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Maximum number of tickers that can be compared at once.
pub const MAX_TICKERS: usize = 6;

const MAX_TICKER_LEN: usize = 12;

/// An uppercase stock symbol such as `AAPL`, `BRK-B` or `005930.KS`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(raw: &str) -> Result<Ticker, ValidationError> {
        let symbol = raw.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ValidationError::EmptyTicker);
        }
        let valid_chars = symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
        if !valid_chars || symbol.len() > MAX_TICKER_LEN {
            return Err(ValidationError::InvalidTicker(raw.trim().to_string()));
        }
        Ok(Ticker(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lookback window for the comparison chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Period {
    OneDay,
    FiveDays,
    #[default]
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    Max,
}

impl Period {
    pub fn all() -> &'static [Period] {
        &[
            Period::OneDay,
            Period::FiveDays,
            Period::OneMonth,
            Period::ThreeMonths,
            Period::SixMonths,
            Period::OneYear,
            Period::Max,
        ]
    }

    /// Query-string value understood by the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::Max => "max",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::OneDay => "1D",
            Period::FiveDays => "5D",
            Period::OneMonth => "1M",
            Period::ThreeMonths => "3M",
            Period::SixMonths => "6M",
            Period::OneYear => "1Y",
            Period::Max => "MAX",
        }
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::all()
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownPeriod(s.to_string()))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookback window for the sector heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HeatmapPeriod {
    #[default]
    OneDay,
    OneWeek,
    OneMonth,
    ThreeMonths,
}

impl HeatmapPeriod {
    pub fn all() -> &'static [HeatmapPeriod] {
        &[
            HeatmapPeriod::OneDay,
            HeatmapPeriod::OneWeek,
            HeatmapPeriod::OneMonth,
            HeatmapPeriod::ThreeMonths,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HeatmapPeriod::OneDay => "1d",
            HeatmapPeriod::OneWeek => "1w",
            HeatmapPeriod::OneMonth => "1mo",
            HeatmapPeriod::ThreeMonths => "3mo",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HeatmapPeriod::OneDay => "1D",
            HeatmapPeriod::OneWeek => "1W",
            HeatmapPeriod::OneMonth => "1M",
            HeatmapPeriod::ThreeMonths => "3M",
        }
    }
}

impl FromStr for HeatmapPeriod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HeatmapPeriod::all()
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownPeriod(s.to_string()))
    }
}

impl fmt::Display for HeatmapPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dimension that drives heatmap colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Metric {
    #[default]
    Change,
    Pe,
    FwdPe,
}

impl Metric {
    pub fn all() -> &'static [Metric] {
        &[Metric::Change, Metric::Pe, Metric::FwdPe]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Change => "change",
            Metric::Pe => "pe",
            Metric::FwdPe => "fwdPe",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Change => "Change",
            Metric::Pe => "P/E",
            Metric::FwdPe => "Fwd P/E",
        }
    }

    pub fn next(self) -> Metric {
        match self {
            Metric::Change => Metric::Pe,
            Metric::Pe => Metric::FwdPe,
            Metric::FwdPe => Metric::Change,
        }
    }
}

impl FromStr for Metric {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "change" => Ok(Metric::Change),
            "pe" => Ok(Metric::Pe),
            "fwdpe" | "fwd_pe" | "forward_pe" => Ok(Metric::FwdPe),
            _ => Err(ValidationError::UnknownMetric(s.to_string())),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive custom date range for the comparison chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<DateRange, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(DateRange { start, end })
    }

    /// Parse `YYYY-MM-DD` strings as typed into the date inputs.
    /// Blank fields count as missing.
    pub fn parse(start: &str, end: &str) -> Result<DateRange, ValidationError> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        match (start, end) {
            (Some(start), Some(end)) => DateRange::new(start, end),
            _ => Err(ValidationError::DateRequired),
        }
    }
}

fn parse_date(raw: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

/// Either a period chip or a custom date range is active, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartWindow {
    Preset(Period),
    Custom(DateRange),
}

impl Default for ChartWindow {
    fn default() -> Self {
        ChartWindow::Preset(Period::default())
    }
}

/// What changed since the last commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Tickers,
    Window,
    HeatmapPeriod,
    Metric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeatmapAction {
    #[default]
    None,
    /// Redraw from the cached dataset
    Rerender,
    /// Drop the cache and fetch the new period
    Refetch,
}

/// Refresh intents produced by [`SelectionState::commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Commit {
    pub chart: bool,
    pub heatmap: HeatmapAction,
}

impl Commit {
    pub fn is_empty(&self) -> bool {
        !self.chart && self.heatmap == HeatmapAction::None
    }
}

/// Everything the user has selected, owned by the app for the whole session.
///
/// Mutations never trigger side effects on their own. They queue a
/// [`SelectionChange`] and the owner calls [`SelectionState::commit`] to
/// find out which views need refreshing.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    tickers: Vec<Ticker>,
    window: ChartWindow,
    heatmap_period: HeatmapPeriod,
    metric: Metric,
    pending: Vec<SelectionChange>,
}

impl SelectionState {
    pub fn new() -> SelectionState {
        SelectionState::default()
    }

    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    pub fn window(&self) -> ChartWindow {
        self.window
    }

    /// Active period chip, `None` while a custom range is applied
    pub fn period(&self) -> Option<Period> {
        match self.window {
            ChartWindow::Preset(p) => Some(p),
            ChartWindow::Custom(_) => None,
        }
    }

    pub fn date_range(&self) -> Option<DateRange> {
        match self.window {
            ChartWindow::Preset(_) => None,
            ChartWindow::Custom(range) => Some(range),
        }
    }

    pub fn heatmap_period(&self) -> HeatmapPeriod {
        self.heatmap_period
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.tickers.contains(ticker)
    }

    /// Returns `Ok(false)` when the ticker is already selected.
    pub fn add_ticker(&mut self, raw: &str) -> Result<bool, ValidationError> {
        let ticker = Ticker::parse(raw)?;
        if self.contains(&ticker) {
            return Ok(false);
        }
        if self.tickers.len() >= MAX_TICKERS {
            return Err(ValidationError::TooManyTickers(MAX_TICKERS));
        }
        self.tickers.push(ticker);
        self.mark(SelectionChange::Tickers);
        Ok(true)
    }

    /// Returns whether anything was removed.
    pub fn remove_ticker(&mut self, raw: &str) -> bool {
        let symbol = raw.trim().to_uppercase();
        let before = self.tickers.len();
        self.tickers.retain(|t| t.as_str() != symbol);
        let removed = self.tickers.len() != before;
        if removed {
            self.mark(SelectionChange::Tickers);
        }
        removed
    }

    pub fn set_period(&mut self, period: Period) {
        let window = ChartWindow::Preset(period);
        if self.window != window {
            self.window = window;
            self.mark(SelectionChange::Window);
        }
    }

    pub fn set_date_range(
        &mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<(), ValidationError> {
        let (Some(start), Some(end)) = (start, end) else {
            return Err(ValidationError::DateRequired);
        };
        let window = ChartWindow::Custom(DateRange::new(start, end)?);
        if self.window != window {
            self.window = window;
            self.mark(SelectionChange::Window);
        }
        Ok(())
    }

    pub fn set_heatmap_period(&mut self, period: HeatmapPeriod) {
        if self.heatmap_period != period {
            self.heatmap_period = period;
            self.mark(SelectionChange::HeatmapPeriod);
        }
    }

    pub fn set_metric(&mut self, metric: Metric) {
        if self.metric != metric {
            self.metric = metric;
            self.mark(SelectionChange::Metric);
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drain queued changes into the refreshes they require.
    pub fn commit(&mut self) -> Commit {
        let mut commit = Commit::default();
        for change in self.pending.drain(..) {
            match change {
                SelectionChange::Tickers | SelectionChange::Window => commit.chart = true,
                SelectionChange::HeatmapPeriod => commit.heatmap = HeatmapAction::Refetch,
                SelectionChange::Metric => {
                    if commit.heatmap == HeatmapAction::None {
                        commit.heatmap = HeatmapAction::Rerender;
                    }
                }
            }
        }
        commit
    }

    fn mark(&mut self, change: SelectionChange) {
        if !self.pending.contains(&change) {
            self.pending.push(change);
        }
    }
}
