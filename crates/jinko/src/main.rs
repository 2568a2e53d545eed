use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use jinko_core::{DECADES, Prefecture, SAMPLE_COUNT};
use jinko_scramble::{ScrambleAnimator, TickScheduler};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Style, Stylize},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, Chart, Clear, Dataset, GraphType, List, ListItem, ListState, Paragraph,
    },
};

mod board;
mod resas;

use board::{PopulationBoard, Toggle};
use resas::{FetchError, ResasClient};

/// Label decoded by the loading animation.
const LOADING_TEXT: &str = "LOADING...";

/// Event-poll timeout; keeps the scramble loop ticking at ~60 fps.
const POLL_TIMEOUT: Duration = Duration::from_millis(16);

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init();
    let config = jinko_config::Config::load()?;
    let client = Arc::new(ResasClient::new(&config.endpoint, &config.api_key));
    let terminal = ratatui::init();
    let result = App::new(client).run(terminal);
    ratatui::restore();
    result
}

/// Outcome of a background fetch, delivered to the UI thread.
enum FetchOutcome {
    Prefectures(Result<Vec<Prefecture>, FetchError>),
    Series {
        code: u32,
        result: Result<[f64; SAMPLE_COUNT], FetchError>,
    },
}

/// The main application which holds the state and logic of the application.
pub struct App {
    /// Is the application running?
    running: bool,
    /// Shared board state: prefectures, series rows, colors, loading.
    board: PopulationBoard,
    /// RESAS API client shared with fetch threads.
    client: Arc<ResasClient>,
    tx: Sender<FetchOutcome>,
    rx: Receiver<FetchOutcome>,
    /// Wall-clock scheduler driving the loading animation.
    scheduler: TickScheduler,
    /// Mounted while any fetch is outstanding.
    animator: Option<ScrambleAnimator>,
    /// Cursor state for the prefecture list.
    list_state: ListState,
}

impl App {
    /// Construct a new instance of [`App`] and start the one-time
    /// prefecture-list fetch.
    pub fn new(client: Arc<ResasClient>) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut board = PopulationBoard::new();

        board.job_started();
        let fetch_client = client.clone();
        let fetch_tx = tx.clone();
        thread::spawn(move || {
            let result = fetch_client.prefectures();
            // Receiver may be gone if the app already exited.
            let _ = fetch_tx.send(FetchOutcome::Prefectures(result));
        });

        Self {
            running: false,
            board,
            client,
            tx,
            rx,
            scheduler: TickScheduler::new(),
            animator: None,
            list_state: ListState::default(),
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.running = true;
        while self.running {
            self.drain_fetches();
            self.sync_animator();
            if let Some(animator) = &mut self.animator {
                animator.poll(&mut self.scheduler);
            }
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events()?;
        }
        Ok(())
    }

    /// Apply completed fetches to the board.
    fn drain_fetches(&mut self) {
        while let Ok(outcome) = self.rx.try_recv() {
            match outcome {
                FetchOutcome::Prefectures(Ok(list)) => {
                    self.board.set_prefectures(list);
                    self.board.job_finished();
                    if self.list_state.selected().is_none() {
                        self.list_state.select_first();
                    }
                }
                FetchOutcome::Prefectures(Err(err)) => {
                    log::warn!("prefecture list fetch failed: {err}");
                    self.board.job_finished();
                }
                FetchOutcome::Series {
                    code,
                    result: Ok(values),
                } => self.board.apply_series(code, values),
                FetchOutcome::Series {
                    code,
                    result: Err(err),
                } => {
                    log::warn!("population fetch for prefecture {code} failed: {err}");
                    self.board.series_failed(code);
                }
            }
        }
    }

    /// Mount the loading animation while any fetch is outstanding and
    /// tear it down (cancelling its pending wakeup) once none is.
    fn sync_animator(&mut self) {
        match (self.board.loading(), self.animator.is_some()) {
            (true, false) => {
                self.animator = Some(ScrambleAnimator::start(LOADING_TEXT, &mut self.scheduler));
            }
            (false, true) => {
                if let Some(mut animator) = self.animator.take() {
                    animator.stop(&mut self.scheduler);
                }
            }
            _ => {}
        }
    }

    /// Renders the user interface.
    fn render(&mut self, frame: &mut Frame) {
        let chunks =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).split(frame.area());
        let columns =
            Layout::horizontal([Constraint::Length(28), Constraint::Fill(1)]).split(chunks[0]);

        self.render_prefecture_list(frame, columns[0]);
        self.render_chart(frame, columns[1]);
        if let Some(animator) = &self.animator {
            render_loading_overlay(frame, columns[1], animator);
        }

        let help = Line::from(vec![
            "↑/↓".bold().cyan(),
            " move  ".dark_gray(),
            "space".bold().cyan(),
            " toggle  ".dark_gray(),
            "q".bold().cyan(),
            " quit".dark_gray(),
        ])
        .centered();
        frame.render_widget(help, chunks[1]);
    }

    /// Render the selectable prefecture list with color swatches for
    /// plotted entries.
    fn render_prefecture_list(&mut self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .board
            .prefectures()
            .iter()
            .map(|pref| {
                let marker = match (pref.selected, self.board.color(pref.code)) {
                    (true, Some(color)) => Span::styled("■ ", Style::new().fg(color)),
                    _ => Span::raw("  "),
                };
                ListItem::new(Line::from(vec![
                    marker,
                    Span::raw(format!("{:>2} {}", pref.code, pref.name)),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(Block::bordered().title("Prefectures"))
            .highlight_style(Style::new().reversed());
        frame.render_stateful_widget(list, area, &mut self.list_state);
    }

    /// Render the population chart, one line per selected prefecture.
    fn render_chart(&self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered().title("Population (万人)");
        let series = self.board.chart_series();
        if series.is_empty() {
            let hint = Paragraph::new("select a prefecture to plot its population")
                .style(Style::new().dark_gray())
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(hint, area);
            return;
        }

        let datasets: Vec<Dataset> = series
            .iter()
            .map(|line| {
                Dataset::default()
                    .name(line.name.clone())
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::new().fg(line.color))
                    .data(&line.points)
            })
            .collect();

        let upper = (self.board.max_value().max(1.0) * 1.1).ceil();
        let x_labels: Vec<Span> = DECADES
            .iter()
            .map(|year| Span::raw(year.to_string()))
            .collect();
        let y_labels = vec![
            Span::raw("0"),
            Span::raw(format!("{:.0}", upper / 2.0)),
            Span::raw(format!("{upper:.0}")),
        ];

        let chart = Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .bounds([f64::from(DECADES[0]), f64::from(DECADES[4])])
                    .labels(x_labels)
                    .style(Style::new().dark_gray()),
            )
            .y_axis(
                Axis::default()
                    .bounds([0.0, upper])
                    .labels(y_labels)
                    .style(Style::new().dark_gray()),
            );
        frame.render_widget(chart, area);
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Uses polling with a frame-length timeout so the animation keeps
    /// ticking while no keys are pressed.
    fn handle_crossterm_events(&mut self) -> color_eyre::Result<()> {
        if event::poll(POLL_TIMEOUT)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Mouse(_) => {}
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Up | KeyCode::Char('k')) => self.list_state.select_previous(),
            (_, KeyCode::Down | KeyCode::Char('j')) => self.list_state.select_next(),
            (_, KeyCode::Char(' ') | KeyCode::Enter) => self.toggle_highlighted(),
            _ => {}
        }
    }

    /// Toggle the prefecture under the cursor, starting a background
    /// fetch if its series was never loaded.
    fn toggle_highlighted(&mut self) {
        let Some(index) = self.list_state.selected() else {
            return;
        };
        let Some(code) = self.board.prefectures().get(index).map(|pref| pref.code) else {
            return;
        };
        match self.board.toggle(code) {
            Toggle::FetchNeeded => self.spawn_series_fetch(code),
            Toggle::Flipped(_) => {}
            Toggle::InFlight => log::debug!("fetch for prefecture {code} already outstanding"),
        }
    }

    fn spawn_series_fetch(&self, code: u32) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = client.population(code);
            // Receiver may be gone if the app already exited; the update
            // is dropped then.
            let _ = tx.send(FetchOutcome::Series { code, result });
        });
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}

/// Draw the scramble animation centered over the chart area.
fn render_loading_overlay(frame: &mut Frame, area: Rect, animator: &ScrambleAnimator) {
    let width = (LOADING_TEXT.len() as u16 + 4).min(area.width);
    let height = 3u16.min(area.height);
    let overlay = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    };
    frame.render_widget(Clear, overlay);
    let text = Paragraph::new(animator.line())
        .alignment(Alignment::Center)
        .block(Block::bordered());
    frame.render_widget(text, overlay);
}
