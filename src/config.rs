use crate::selection::{HeatmapPeriod, Metric, Period, SelectionState};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

const APP_NAME: &str = "stockview";
const CONFIG_NAME: &str = "config";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    pub default_tickers: Vec<String>,
    pub default_period: String,
    pub heatmap_period: String,
    pub metric: String,
    /// Size of one terminal cell in heatmap layout pixels.
    pub cell_width_px: u16,
    pub cell_height_px: u16,
    pub request_timeout_secs: u64,
    /// Where the dashboard writes its log while it owns the terminal.
    pub log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8080".to_string(),
            default_tickers: vec!["AAPL".to_string(), "NVDA".to_string()],
            default_period: "1mo".to_string(),
            heatmap_period: "1d".to_string(),
            metric: "change".to_string(),
            cell_width_px: 8,
            cell_height_px: 16,
            request_timeout_secs: 30,
            log_file: "stockview.log".to_string(),
        }
    }
}

pub fn load() -> Result<Config, confy::ConfyError> {
    confy::load(APP_NAME, CONFIG_NAME)
}

pub fn path() -> Result<PathBuf, confy::ConfyError> {
    confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
}

// unknown names in the config file are not fatal
fn parse_or_default<T: FromStr + Default>(raw: &str, key: &str) -> T
where
    T::Err: std::fmt::Display,
{
    raw.parse().unwrap_or_else(|e| {
        warn!(key, error = %e, "invalid config value, using default");
        T::default()
    })
}

impl Config {
    pub fn period(&self) -> Period {
        parse_or_default(&self.default_period, "default_period")
    }

    pub fn heatmap_period(&self) -> HeatmapPeriod {
        parse_or_default(&self.heatmap_period, "heatmap_period")
    }

    pub fn metric(&self) -> Metric {
        parse_or_default(&self.metric, "metric")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Selection the dashboard starts with. Nothing is left pending.
    pub fn initial_selection(&self) -> SelectionState {
        let mut state = SelectionState::new();
        for ticker in &self.default_tickers {
            if let Err(e) = state.add_ticker(ticker) {
                warn!(%ticker, error = %e, "skipping default ticker");
            }
        }
        state.set_period(self.period());
        state.set_heatmap_period(self.heatmap_period());
        state.set_metric(self.metric());
        state.commit();
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::ChartWindow;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.period(), Period::OneMonth);
        assert_eq!(cfg.heatmap_period(), HeatmapPeriod::OneDay);
        assert_eq!(cfg.metric(), Metric::Change);
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"server_url": "http://dash:9000"}"#).unwrap();
        assert_eq!(cfg.server_url, "http://dash:9000");
        assert_eq!(cfg.default_tickers, vec!["AAPL", "NVDA"]);
        assert_eq!(cfg.cell_height_px, 16);
    }

    #[test]
    fn test_bad_names_fall_back() {
        let cfg = Config {
            default_period: "2w".to_string(),
            heatmap_period: "forever".to_string(),
            metric: "beta".to_string(),
            ..Config::default()
        };
        assert_eq!(cfg.period(), Period::OneMonth);
        assert_eq!(cfg.heatmap_period(), HeatmapPeriod::OneDay);
        assert_eq!(cfg.metric(), Metric::Change);
    }

    #[test]
    fn test_initial_selection() {
        let cfg = Config {
            default_tickers: vec!["msft".into(), "not a ticker".into(), "BRK-B".into()],
            default_period: "1y".into(),
            metric: "pe".into(),
            ..Config::default()
        };
        let state = cfg.initial_selection();
        let tickers: Vec<&str> = state.tickers().iter().map(|t| t.as_str()).collect();
        assert_eq!(tickers, ["MSFT", "BRK-B"]);
        assert_eq!(state.window(), ChartWindow::Preset(Period::OneYear));
        assert_eq!(state.metric(), Metric::Pe);
        assert!(!state.has_pending());
    }
}
