use std::sync::Mutex;

use crate::api::{CompareRequest, DashboardClient, MarketData};
use crate::config::Config;
use crate::selection::{DateRange, HeatmapPeriod, Metric, Period, SelectionState};

use clap::{arg, ArgMatches, Command};
use colored::Colorize;
use eyre::{eyre, Result, WrapErr};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod chart;
mod config;
mod error;
mod heatmap;
mod popup;
mod report;
mod selection;
mod treemap;
mod tui;

fn server_arg() -> clap::Arg {
    arg!(-s --server <URL> "Dashboard backend URL (overrides the config file)").required(false)
}

fn cli() -> Command {
    Command::new("stockview")
        .about("Compare stock returns and browse a sector heatmap")
        .arg_required_else_help(true)
        .subcommand(Command::new("config").about("Print the path to the config file"))
        .subcommand(
            Command::new("dashboard")
                .about("Open the interactive dashboard")
                .arg(arg!(-t --tab <TAB> "Tab to open first: chart or heatmap").required(false))
                .arg(server_arg()),
        )
        .subcommand(
            Command::new("compare")
                .about("Print the returns of up to six tickers")
                .arg(arg!(<TICKERS> ... "Ticker symbols, e.g. AAPL NVDA"))
                .arg(
                    arg!(-p --period <PERIOD> "1d, 5d, 1mo, 3mo, 6mo, 1y or max")
                        .required(false)
                        .conflicts_with_all(["start", "end"]),
                )
                .arg(
                    arg!(--start <DATE> "Custom range start (YYYY-MM-DD)")
                        .required(false)
                        .requires("end"),
                )
                .arg(
                    arg!(--end <DATE> "Custom range end (YYYY-MM-DD)")
                        .required(false)
                        .requires("start"),
                )
                .arg(server_arg()),
        )
        .subcommand(
            Command::new("heatmap")
                .about("Print the sector heatmap as a table")
                .arg(arg!(-p --period <PERIOD> "1d, 1w, 1mo or 3mo").required(false))
                .arg(arg!(-m --metric <METRIC> "change, pe or fwdPe").required(false))
                .arg(server_arg()),
        )
}

/// The dashboard owns the terminal, so it logs to a file. Everything else
/// logs to stderr.
fn init_logging(log_file: Option<&str>) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stockview=info"));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .wrap_err_with(|| format!("Failed to open log file {path}"))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn client_for(cfg: &Config, matches: &ArgMatches) -> Result<DashboardClient> {
    let server = matches
        .get_one::<String>("server")
        .map(String::as_str)
        .unwrap_or(&cfg.server_url);
    Ok(DashboardClient::new(server, cfg.timeout())?)
}

fn compare_selection(cfg: &Config, matches: &ArgMatches) -> Result<SelectionState> {
    let mut selection = SelectionState::new();
    for ticker in matches.get_many::<String>("TICKERS").into_iter().flatten() {
        if !selection.add_ticker(ticker)? {
            eprintln!("{} {ticker} is listed twice", "warning:".yellow().bold());
        }
    }

    match (
        matches.get_one::<String>("start"),
        matches.get_one::<String>("end"),
    ) {
        (Some(start), Some(end)) => {
            let range = DateRange::parse(start, end)?;
            selection.set_date_range(Some(range.start), Some(range.end))?;
        }
        _ => {
            let period: Period = match matches.get_one::<String>("period") {
                Some(p) => p.parse()?,
                None => cfg.period(),
            };
            selection.set_period(period);
        }
    }
    Ok(selection)
}

async fn run_compare(cfg: &Config, matches: &ArgMatches) -> Result<()> {
    let selection = compare_selection(cfg, matches)?;
    let request =
        CompareRequest::from_selection(&selection).ok_or_else(|| eyre!("No tickers given"))?;
    let client = client_for(cfg, matches)?;

    let response = client.compare(&request).await?;
    info!(stocks = response.stocks.len(), "compare finished");
    println!("{}", report::compare_table(&response));
    Ok(())
}

async fn run_heatmap(cfg: &Config, matches: &ArgMatches) -> Result<()> {
    let period: HeatmapPeriod = match matches.get_one::<String>("period") {
        Some(p) => p.parse()?,
        None => cfg.heatmap_period(),
    };
    let metric: Metric = match matches.get_one::<String>("metric") {
        Some(m) => m.parse()?,
        None => cfg.metric(),
    };
    let client = client_for(cfg, matches)?;

    let dataset = client.heatmap(period).await?;
    if dataset.is_empty() {
        println!("No heatmap data for {period}");
        return Ok(());
    }
    println!("{}", report::heatmap_table(&dataset, metric));
    Ok(())
}

async fn run_dashboard(cfg: &Config, matches: &ArgMatches) -> Result<()> {
    init_logging(Some(&cfg.log_file))?;
    let tab = match matches.get_one::<String>("tab") {
        Some(name) => Some(tui::Tab::from_name(name).ok_or_else(|| eyre!("Unknown tab: {name}"))?),
        None => None,
    };
    let client = client_for(cfg, matches)?;
    info!(server = client.base_url(), "starting dashboard");
    tui::run_tui(cfg, client, tab).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    let cfg = config::load().wrap_err("Failed to load config")?;

    let result = match matches.subcommand() {
        Some(("config", _)) => {
            println!(
                "Your config file is located here: \n{}",
                config::path()?.display()
            );
            Ok(())
        }
        Some(("dashboard", m)) => run_dashboard(&cfg, m).await,
        Some(("compare", m)) => {
            init_logging(None)?;
            run_compare(&cfg, m).await
        }
        Some(("heatmap", m)) => {
            init_logging(None)?;
            run_heatmap(&cfg, m).await
        }
        _ => {
            cli().print_help()?;
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::selection::ChartWindow;

    #[test]
    fn test_cli() {
        let matches = cli().get_matches_from(vec!["stockview", "compare", "AAPL", "NVDA"]);
        assert_eq!(matches.subcommand_name(), Some("compare"));
    }

    #[test]
    fn test_cli_rejects_period_with_range() {
        let res = cli().try_get_matches_from(vec![
            "stockview", "compare", "AAPL", "--period", "1y", "--start", "2024-01-01", "--end",
            "2024-02-01",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_compare_selection_period() {
        let matches = cli().get_matches_from(vec!["stockview", "compare", "aapl", "-p", "6mo"]);
        let (_, m) = matches.subcommand().unwrap();
        let selection = compare_selection(&Config::default(), m).unwrap();
        assert_eq!(selection.tickers()[0].as_str(), "AAPL");
        assert_eq!(selection.window(), ChartWindow::Preset(Period::SixMonths));
    }

    #[test]
    fn test_compare_selection_uses_config_period() {
        let cfg = Config {
            default_period: "5d".into(),
            ..Config::default()
        };
        let matches = cli().get_matches_from(vec!["stockview", "compare", "MSFT"]);
        let (_, m) = matches.subcommand().unwrap();
        let selection = compare_selection(&cfg, m).unwrap();
        assert_eq!(selection.period(), Some(Period::FiveDays));
    }

    #[test]
    fn test_compare_selection_range() {
        let matches = cli().get_matches_from(vec![
            "stockview", "compare", "AAPL", "--start", "2024-01-01", "--end", "2024-02-01",
        ]);
        let (_, m) = matches.subcommand().unwrap();
        let selection = compare_selection(&Config::default(), m).unwrap();
        assert!(matches!(selection.window(), ChartWindow::Custom(_)));
    }

    #[test]
    fn test_compare_selection_too_many() {
        let matches = cli().get_matches_from(vec![
            "stockview", "compare", "A", "B", "C", "D", "E", "F", "G",
        ]);
        let (_, m) = matches.subcommand().unwrap();
        let err = compare_selection(&Config::default(), m).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::TooManyTickers(6))
        );
    }

    #[test]
    fn test_client_server_override() {
        let matches = cli().get_matches_from(vec![
            "stockview",
            "heatmap",
            "--server",
            "http://example.test:9000/",
        ]);
        let (_, m) = matches.subcommand().unwrap();
        let client = client_for(&Config::default(), m).unwrap();
        assert_eq!(client.base_url(), "http://example.test:9000");
    }
}
