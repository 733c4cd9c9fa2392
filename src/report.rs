use crate::api::{CompareResponse, SectorDataset};
use crate::chart::series_color;
use crate::heatmap::{color_for_metric, display_value, format_change, weight};
use crate::popup::format_market_cap;
use crate::selection::Metric;
use comfy_table::{
    presets::UTF8_FULL, Attribute, Cell, CellAlignment, Color as TColor, ContentArrangement, Table,
};
use ratatui::style::Color;

/// Terminal table colour for a dashboard colour.
pub fn table_color(color: Color) -> TColor {
    match color {
        Color::Rgb(r, g, b) => TColor::Rgb { r, g, b },
        Color::Green => TColor::Green,
        Color::Red => TColor::Red,
        Color::Yellow => TColor::Yellow,
        Color::Cyan => TColor::Cyan,
        _ => TColor::White,
    }
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    table.set_header(
        header
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );
    table
}

fn updown(value: f64) -> TColor {
    if value >= 0.0 {
        TColor::Green
    } else {
        TColor::Red
    }
}

// Returns over the requested window, one row per ticker
pub fn compare_table(response: &CompareResponse) -> Table {
    let mut table = new_table(&["Ticker", "Name", "Price", "Return", "Points"]);

    for (i, stock) in response.stocks.iter().enumerate() {
        let price = stock
            .price
            .map_or_else(|| "-".to_string(), |p| format!("{p:.2}"));
        let ret = match stock.return_pct {
            Some(r) => Cell::new(format_change(Some(r))).fg(updown(r)),
            None => Cell::new("-"),
        };
        table.add_row(vec![
            Cell::new(&stock.ticker)
                .fg(table_color(series_color(i)))
                .add_attribute(Attribute::Bold),
            Cell::new(stock.name.as_deref().unwrap_or("")),
            Cell::new(price).set_alignment(CellAlignment::Right),
            ret.set_alignment(CellAlignment::Right),
            Cell::new(stock.data.len()).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// Sectors and their stocks, largest first, with the metric cell coloured
/// like the heatmap tile.
pub fn heatmap_table(dataset: &SectorDataset, metric: Metric) -> Table {
    let mut table = new_table(&["Sector", "Ticker", "Price", "Change", "Market Cap", metric.label()]);

    let mut sectors: Vec<_> = dataset
        .sectors
        .iter()
        .map(|s| (s, s.stocks.iter().map(weight).sum::<f64>()))
        .collect();
    sectors.sort_by(|a, b| b.1.total_cmp(&a.1));

    for (sector, _) in sectors {
        let mut stocks: Vec<_> = sector.stocks.iter().collect();
        stocks.sort_by(|a, b| weight(b).total_cmp(&weight(a)));

        for (i, stock) in stocks.into_iter().enumerate() {
            let sector_cell = if i == 0 {
                Cell::new(&sector.name).add_attribute(Attribute::Bold)
            } else {
                Cell::new("")
            };
            let change = stock.change.unwrap_or(0.0);
            table.add_row(vec![
                sector_cell,
                Cell::new(&stock.ticker),
                Cell::new(
                    stock
                        .price
                        .map_or_else(|| "-".to_string(), |p| format!("{p:.2}")),
                )
                .set_alignment(CellAlignment::Right),
                Cell::new(format_change(stock.change))
                    .fg(updown(change))
                    .set_alignment(CellAlignment::Right),
                Cell::new(format_market_cap(stock.market_cap)).set_alignment(CellAlignment::Right),
                Cell::new(display_value(stock, metric))
                    .bg(table_color(color_for_metric(stock, metric)))
                    .fg(TColor::White)
                    .set_alignment(CellAlignment::Right),
            ]);
        }
    }
    table
}
