use crate::api::{CompareResponse, MarketData, SectorDataset};
use crate::chart::{series_color, ChartView, Ticket};
use crate::config::Config;
use crate::error::{ApiError, ValidationError};
use crate::heatmap::{self, HeatmapStatus, HeatmapView, HitTarget};
use crate::popup::{ClickOutcome, PopupController};
use crate::selection::{DateRange, HeatmapAction, HeatmapPeriod, Period, SelectionState};
use chrono::{Local, Months, NaiveDate};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Chart,
    Heatmap,
}

impl Tab {
    fn title(self) -> &'static str {
        match self {
            Tab::Chart => "Compare",
            Tab::Heatmap => "Sector Heatmap",
        }
    }

    fn all() -> &'static [Tab] {
        &[Tab::Chart, Tab::Heatmap]
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "chart" | "compare" => Some(Tab::Chart),
            "heatmap" => Some(Tab::Heatmap),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateInput {
    pub start: String,
    pub end: String,
    pub field: DateField,
}

impl DateInput {
    /// Prefilled from the current custom range, or the last month up to today.
    fn for_selection(selection: &SelectionState) -> DateInput {
        let (start, end) = match selection.date_range() {
            Some(range) => (range.start, range.end),
            None => default_range(Local::now().date_naive()),
        };
        DateInput {
            start: start.to_string(),
            end: end.to_string(),
            field: DateField::Start,
        }
    }

    fn active_mut(&mut self) -> &mut String {
        match self.field {
            DateField::Start => &mut self.start,
            DateField::End => &mut self.end,
        }
    }
}

fn default_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today.checked_sub_months(Months::new(1)).unwrap_or(today);
    (start, today)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Ticker(String),
    Date(DateInput),
}

/// Completed background fetch, sent back to the event loop.
#[derive(Debug)]
pub enum FetchResult {
    Chart(Ticket, Result<CompareResponse, ApiError>),
    Heatmap(HeatmapPeriod, Result<SectorDataset, ApiError>),
}

pub struct App<M> {
    pub current_tab: Tab,
    pub should_quit: bool,
    pub mode: InputMode,
    pub selection: SelectionState,
    pub chart: ChartView,
    pub heatmap: HeatmapView,
    pub popup: PopupController,
    pub selected_tag: usize,
    pub notice: Option<String>,
    provider: M,
    sender: mpsc::UnboundedSender<FetchResult>,
    receiver: mpsc::UnboundedReceiver<FetchResult>,
}

impl<M> App<M>
where
    M: MarketData + Clone + Send + Sync + 'static,
{
    pub fn new(
        provider: M,
        selection: SelectionState,
        cell_width_px: u16,
        cell_height_px: u16,
    ) -> App<M> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let heatmap = HeatmapView::new(selection.metric(), cell_width_px, cell_height_px);
        App {
            current_tab: Tab::Chart,
            should_quit: false,
            mode: InputMode::Normal,
            selection,
            chart: ChartView::new(),
            heatmap,
            popup: PopupController::new(),
            selected_tag: 0,
            notice: None,
            provider,
            sender,
            receiver,
        }
    }

    /// Initial fetches for whatever the selection already holds.
    pub fn start(&mut self) {
        self.selection.commit();
        self.refresh_chart();
        if self.current_tab == Tab::Heatmap {
            self.load_heatmap();
        }
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
        if tab == Tab::Heatmap {
            self.load_heatmap();
        }
    }

    pub fn next_tab(&mut self) {
        let tabs = Tab::all();
        let current_index = tabs
            .iter()
            .position(|&t| t == self.current_tab)
            .unwrap_or(0);
        self.set_tab(tabs[(current_index + 1) % tabs.len()]);
    }

    pub fn previous_tab(&mut self) {
        let tabs = Tab::all();
        let current_index = tabs
            .iter()
            .position(|&t| t == self.current_tab)
            .unwrap_or(0);
        self.set_tab(tabs[(current_index + tabs.len() - 1) % tabs.len()]);
    }

    fn refresh_chart(&mut self) {
        let Some(ticket) = self.chart.begin_refresh(&self.selection) else {
            return;
        };
        let provider = self.provider.clone();
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let result = provider.compare(&ticket.request).await;
            // receiver gone means the app is shutting down
            let _ = sender.send(FetchResult::Chart(ticket, result));
        });
    }

    fn load_heatmap(&mut self) {
        if self.heatmap.status() == HeatmapStatus::Loading {
            return;
        }
        let Some(period) = self.heatmap.begin_load(self.selection.heatmap_period()) else {
            return;
        };
        debug!(%period, "fetching heatmap");
        let provider = self.provider.clone();
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let result = provider.heatmap(period).await;
            let _ = sender.send(FetchResult::Heatmap(period, result));
        });
    }

    /// Turn pending selection changes into fetches and redraws.
    pub fn commit(&mut self) {
        if !self.selection.has_pending() {
            return;
        }
        let commit = self.selection.commit();
        if commit.is_empty() {
            return;
        }
        debug!(?commit, "committing selection");
        if commit.chart {
            self.refresh_chart();
        }
        match commit.heatmap {
            HeatmapAction::None => {}
            HeatmapAction::Rerender => self.heatmap.set_metric(self.selection.metric()),
            HeatmapAction::Refetch => {
                self.heatmap.set_metric(self.selection.metric());
                self.heatmap.invalidate();
                if self.current_tab == Tab::Heatmap {
                    self.load_heatmap();
                }
            }
        }
    }

    fn handle_fetch(&mut self, result: FetchResult) {
        match result {
            FetchResult::Chart(ticket, result) => {
                self.chart.apply(&ticket, result);
            }
            FetchResult::Heatmap(period, result) => {
                self.heatmap
                    .apply(period, self.selection.heatmap_period(), result);
            }
        }
    }

    pub fn try_receive_updates(&mut self) -> bool {
        let mut updated = false;
        while let Ok(result) = self.receiver.try_recv() {
            self.handle_fetch(result);
            updated = true;
        }
        updated
    }

    pub fn tick(&mut self) {
        self.popup.tick();
    }

    fn show_error(&mut self, err: ValidationError) {
        match err {
            ValidationError::EmptyTicker => {}
            err => self.notice = Some(err.to_string()),
        }
    }

    fn submit_ticker(&mut self, input: &str) {
        match self.selection.add_ticker(input) {
            Ok(true) => {
                self.selected_tag = self.selection.tickers().len() - 1;
                self.commit();
            }
            Ok(false) => {}
            Err(e) => self.show_error(e),
        }
    }

    fn submit_dates(&mut self, input: &DateInput) {
        let applied = DateRange::parse(&input.start, &input.end).and_then(|range| {
            self.selection
                .set_date_range(Some(range.start), Some(range.end))
        });
        match applied {
            Ok(()) => self.commit(),
            Err(e) => self.show_error(e),
        }
    }

    fn remove_selected_tag(&mut self) {
        let Some(ticker) = self.selection.tickers().get(self.selected_tag).cloned() else {
            return;
        };
        self.selection.remove_ticker(ticker.as_str());
        let len = self.selection.tickers().len();
        if self.selected_tag >= len {
            self.selected_tag = len.saturating_sub(1);
        }
        self.commit();
    }

    fn send_to_chart(&mut self) {
        let Some(outcome) = self.popup.send_to_chart(&mut self.selection) else {
            return;
        };
        match outcome.added {
            Ok(true) => {
                info!(ticker = %outcome.ticker, "added from heatmap");
                self.selected_tag = self.selection.tickers().len() - 1;
            }
            Ok(false) => {}
            Err(e) => self.show_error(e),
        }
        self.set_tab(Tab::Chart);
        self.commit();
    }

    fn open_target(&mut self, target: HitTarget) {
        match target {
            HitTarget::Leaf { sector, stock } => {
                if let Some(stock) = self.heatmap.stock(sector, stock).cloned() {
                    self.popup.open_detail(stock);
                }
            }
            HitTarget::SectorHeader(index) => {
                if let Some(sector) = self.heatmap.sector(index).cloned() {
                    self.popup.open_sector_list(sector.name, sector.stocks);
                }
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.notice.take().is_some() {
            return;
        }
        match self.mode {
            InputMode::Ticker(_) => self.handle_ticker_key(key),
            InputMode::Date(_) => self.handle_date_key(key),
            InputMode::Normal if self.popup.is_open() => self.handle_popup_key(key),
            InputMode::Normal => self.handle_normal_key(key),
        }
    }

    fn handle_ticker_key(&mut self, key: KeyEvent) {
        let InputMode::Ticker(buf) = &mut self.mode else {
            return;
        };
        match key.code {
            KeyCode::Char(c) => buf.push(c.to_ascii_uppercase()),
            KeyCode::Backspace => {
                buf.pop();
            }
            KeyCode::Esc => self.mode = InputMode::Normal,
            KeyCode::Enter => {
                let input = std::mem::take(buf);
                self.mode = InputMode::Normal;
                self.submit_ticker(&input);
            }
            _ => {}
        }
    }

    fn handle_date_key(&mut self, key: KeyEvent) {
        let InputMode::Date(input) = &mut self.mode else {
            return;
        };
        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => input.active_mut().push(c),
            KeyCode::Backspace => {
                input.active_mut().pop();
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                input.field = match input.field {
                    DateField::Start => DateField::End,
                    DateField::End => DateField::Start,
                };
            }
            KeyCode::Esc => self.mode = InputMode::Normal,
            KeyCode::Enter => {
                let input = input.clone();
                self.mode = InputMode::Normal;
                self.submit_dates(&input);
            }
            _ => {}
        }
    }

    fn handle_popup_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') => self.send_to_chart(),
            KeyCode::Esc | KeyCode::Char('x') => self.popup.close(),
            KeyCode::Char('j') | KeyCode::Down => self.popup.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.popup.select_prev(),
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Tab => {
                self.next_tab();
                return;
            }
            KeyCode::BackTab => {
                self.previous_tab();
                return;
            }
            _ => {}
        }

        match self.current_tab {
            Tab::Chart => self.handle_chart_key(key),
            Tab::Heatmap => self.handle_heatmap_key(key),
        }
    }

    fn handle_chart_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('a') => self.mode = InputMode::Ticker(String::new()),
            KeyCode::Char('d') => {
                self.mode = InputMode::Date(DateInput::for_selection(&self.selection));
            }
            KeyCode::Char('[') | KeyCode::Char('h') | KeyCode::Left => {
                self.selected_tag = self.selected_tag.saturating_sub(1);
            }
            KeyCode::Char(']') | KeyCode::Char('l') | KeyCode::Right => {
                if self.selected_tag + 1 < self.selection.tickers().len() {
                    self.selected_tag += 1;
                }
            }
            KeyCode::Char('x') | KeyCode::Delete => self.remove_selected_tag(),
            KeyCode::Char(c @ '1'..='7') => {
                let index = c as usize - '1' as usize;
                if let Some(&period) = Period::all().get(index) {
                    self.selection.set_period(period);
                    self.commit();
                }
            }
            _ => {}
        }
    }

    fn handle_heatmap_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                if let Some(&period) = HeatmapPeriod::all().get(index) {
                    self.selection.set_heatmap_period(period);
                    self.commit();
                }
            }
            KeyCode::Char('m') => {
                self.selection.set_metric(self.selection.metric().next());
                self.commit();
            }
            KeyCode::Left => self.heatmap.move_cursor(heatmap::Direction::Left),
            KeyCode::Right => self.heatmap.move_cursor(heatmap::Direction::Right),
            KeyCode::Up => self.heatmap.move_cursor(heatmap::Direction::Up),
            KeyCode::Down => self.heatmap.move_cursor(heatmap::Direction::Down),
            KeyCode::Enter => {
                if let Some(target) = self.heatmap.focused() {
                    self.open_target(target);
                }
            }
            KeyCode::Char('s') => {
                if let Some(HitTarget::Leaf { sector, .. }) = self.heatmap.focused() {
                    self.open_target(HitTarget::SectorHeader(sector));
                }
            }
            KeyCode::Char('r') => {
                self.heatmap.invalidate();
                self.load_heatmap();
            }
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        // a notice swallows input until a key dismisses it
        if self.notice.is_some() || mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        if self.popup.is_open() {
            if let ClickOutcome::Row(_) = self.popup.handle_click(mouse.column, mouse.row) {
                self.send_to_chart();
            }
            return;
        }
        if self.current_tab == Tab::Heatmap {
            if let Some(target) = self.heatmap.hit_test(mouse.column, mouse.row) {
                self.open_target(target);
            }
        }
    }
}

pub async fn run_tui<M>(config: &Config, provider: M, tab: Option<Tab>) -> eyre::Result<()>
where
    M: MarketData + Clone + Send + Sync + 'static,
{
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(
        provider,
        config.initial_selection(),
        config.cell_width_px,
        config.cell_height_px,
    );
    if let Some(tab) = tab {
        app.current_tab = tab;
    }
    app.start();

    let res = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = %err, "dashboard stopped");
        return Err(err.into());
    }
    info!("dashboard closed");
    Ok(())
}

async fn run_app<M>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App<M>,
) -> io::Result<()>
where
    M: MarketData + Clone + Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        // Apply finished fetches (non-blocking)
        app.try_receive_updates();
        app.tick();

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
        // let spawned fetches make progress between polls
        tokio::task::yield_now().await;
    }
    Ok(())
}

fn ui<M>(f: &mut Frame, app: &mut App<M>)
where
    M: MarketData + Clone + Send + Sync + 'static,
{
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    let tab_titles: Vec<Line> = Tab::all()
        .iter()
        .map(|t| {
            let style = if *t == app.current_tab {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(Span::styled(t.title(), style))
        })
        .collect();

    let tabs = Tabs::new(tab_titles)
        .block(Block::default().borders(Borders::ALL).title("stockview"))
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(Color::Yellow))
        .select(
            Tab::all()
                .iter()
                .position(|&t| t == app.current_tab)
                .unwrap_or(0),
        );
    f.render_widget(tabs, chunks[0]);

    match app.current_tab {
        Tab::Chart => render_chart_tab(f, chunks[1], app),
        Tab::Heatmap => render_heatmap_tab(f, chunks[1], app),
    }

    let help = match (app.current_tab, app.popup.is_open()) {
        (_, true) => "c (add to chart) | ↑↓ (select) | Esc/x (close)",
        (Tab::Chart, false) => {
            "a (add) | [ ] (select tag) | x (remove) | 1-7 (period) | d (dates) | Tab | q (quit)"
        }
        (Tab::Heatmap, false) => {
            "1-4 (period) | m (metric) | arrows (move) | Enter (detail) | s (sector) | Tab | q (quit)"
        }
    };
    let help_text = Paragraph::new(help)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    f.render_widget(help_text, chunks[2]);

    let full = f.area();
    app.popup.render(f, full);

    match &app.mode {
        InputMode::Normal => {}
        InputMode::Ticker(buf) => render_ticker_dialog(f, buf),
        InputMode::Date(input) => render_date_dialog(f, input),
    }

    if let Some(notice) = &app.notice {
        render_error_popup(f, notice);
    }
}

fn render_chart_tab<M>(f: &mut Frame, area: Rect, app: &App<M>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let mut tags = vec![Span::styled("Tickers ", Style::default().fg(Color::Gray))];
    if app.selection.tickers().is_empty() {
        tags.push(Span::styled(
            "none, press a to add",
            Style::default().fg(Color::DarkGray),
        ));
    }
    for (i, ticker) in app.selection.tickers().iter().enumerate() {
        let mut style = Style::default()
            .fg(series_color(i))
            .add_modifier(Modifier::BOLD);
        if i == app.selected_tag {
            style = style.add_modifier(Modifier::REVERSED);
        }
        tags.push(Span::styled(format!(" {ticker} × "), style));
        tags.push(Span::raw(" "));
    }

    let mut chips = vec![Span::styled("Period  ", Style::default().fg(Color::Gray))];
    let active = app.selection.period();
    for (i, period) in Period::all().iter().enumerate() {
        let style = if active == Some(*period) {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        chips.push(Span::styled(format!("{}:{} ", i + 1, period.label()), style));
    }
    if let Some(range) = app.selection.date_range() {
        chips.push(Span::styled(
            format!(" {} ~ {}", range.start, range.end),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let controls = Paragraph::new(vec![Line::from(tags), Line::from(chips)])
        .block(Block::default().borders(Borders::ALL).title("Selection"));
    f.render_widget(controls, chunks[0]);

    app.chart.render(f, chunks[1]);
}

fn render_heatmap_tab<M>(f: &mut Frame, area: Rect, app: &mut App<M>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let mut spans = vec![Span::styled("Period  ", Style::default().fg(Color::Gray))];
    for (i, period) in HeatmapPeriod::all().iter().enumerate() {
        let style = if app.selection.heatmap_period() == *period {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!("{}:{} ", i + 1, period.label()), style));
    }
    spans.push(Span::styled("   Metric ", Style::default().fg(Color::Gray)));
    spans.push(Span::styled(
        app.selection.metric().label(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ));

    let controls =
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(controls, chunks[0]);

    app.heatmap.render(f, chunks[1]);
}

fn render_ticker_dialog(f: &mut Frame, input: &str) {
    let popup_area = centered_rect(40, 20, f.area());
    f.render_widget(Clear, popup_area);

    let field = Paragraph::new(format!("{input}█"))
        .style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Add Ticker ")
                .title_alignment(Alignment::Center)
                .title_bottom(Line::from(" Enter: add | Esc: cancel ").centered())
                .style(Style::default().bg(Color::Black)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(field, popup_area);
}

fn render_date_dialog(f: &mut Frame, input: &DateInput) {
    let popup_area = centered_rect(50, 30, f.area());
    f.render_widget(Clear, popup_area);

    let row = |label: &str, value: &str, active: bool| {
        let style = if active {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let cursor = if active { "█" } else { "" };
        Line::from(vec![
            Span::styled(format!("{label:<7}"), Style::default().fg(Color::Gray)),
            Span::styled(format!("{value}{cursor}"), style),
        ])
    };

    let lines = vec![
        row("Start", &input.start, input.field == DateField::Start),
        row("End", &input.end, input.field == DateField::End),
        Line::from(""),
        Line::from(Span::styled(
            "YYYY-MM-DD",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let dialog = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Custom Range ")
            .title_alignment(Alignment::Center)
            .title_bottom(Line::from(" Tab: switch | Enter: apply | Esc: cancel ").centered())
            .style(Style::default().bg(Color::Black)),
    );
    f.render_widget(dialog, popup_area);
}

fn render_error_popup(f: &mut Frame, error: &str) {
    let popup_area = centered_rect(60, 20, f.area());
    f.render_widget(Clear, popup_area);

    let error_paragraph = Paragraph::new(error)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Notice")
                .title_bottom(Line::from(" any key to dismiss ").centered())
                .style(Style::default().fg(Color::Red)),
        )
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(error_paragraph, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
