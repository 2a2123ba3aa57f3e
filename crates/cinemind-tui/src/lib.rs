use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use cinemind_core::{
    export_recommendations, RecommendError, RecommendationEngine, SearchPhase, SearchSession,
};
use cinemind_schema::{
    detail_poster_url, DurationPreference, Movie, RecommendationResponse, UserPreferences, GENRES,
    MOODS,
};

const GRID_COLS: usize = 3;
const GRID_ROWS: usize = 2;

type SearchOutcome = Result<RecommendationResponse, RecommendError>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Screen {
    Form,
    Results,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum FormField {
    Genres,
    Mood,
    Duration,
    RecentlyWatched,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            FormField::Genres => FormField::Mood,
            FormField::Mood => FormField::Duration,
            FormField::Duration => FormField::RecentlyWatched,
            FormField::RecentlyWatched => FormField::Genres,
        }
    }
}

struct App {
    session: SearchSession,
    screen: Screen,
    focus: FormField,
    genre_cursor: usize,
    genres_selected: Vec<bool>,
    mood_cursor: usize,
    mood_selected: Option<usize>,
    recently_watched: String,
    duration: DurationPreference,
    card_cursor: usize,
    detail_open: bool,
    status: Option<String>,
    export_dir: PathBuf,
    pending_submit: Option<UserPreferences>,
    should_quit: bool,
}

impl App {
    fn new(export_dir: PathBuf) -> Self {
        Self {
            session: SearchSession::new(),
            screen: Screen::Form,
            focus: FormField::Genres,
            genre_cursor: 0,
            genres_selected: vec![false; GENRES.len()],
            mood_cursor: 0,
            mood_selected: None,
            recently_watched: String::new(),
            duration: DurationPreference::Any,
            card_cursor: 0,
            detail_open: false,
            status: None,
            export_dir,
            pending_submit: None,
            should_quit: false,
        }
    }

    fn preferences(&self) -> UserPreferences {
        UserPreferences {
            mood: self.mood_selected.map(|i| MOODS[i].to_string()),
            favorite_genres: self
                .genres_selected
                .iter()
                .enumerate()
                .filter(|(_, on)| **on)
                .map(|(i, _)| GENRES[i].to_string())
                .collect(),
            recently_watched: self.recently_watched.clone(),
            duration_preference: self.duration,
        }
    }

    fn on_key(&mut self, key: KeyCode) {
        self.status = None;
        if self.detail_open {
            if matches!(key, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                self.detail_open = false;
            }
            return;
        }
        match self.screen {
            Screen::Form => self.on_form_key(key),
            Screen::Results => self.on_results_key(key),
        }
    }

    fn on_form_key(&mut self, key: KeyCode) {
        let typing = self.focus == FormField::RecentlyWatched;
        match key {
            KeyCode::Char('q') if !typing => self.should_quit = true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::Enter => self.submit(),
            KeyCode::Left => match self.focus {
                FormField::Genres => self.genre_cursor = self.genre_cursor.saturating_sub(1),
                FormField::Mood => self.mood_cursor = self.mood_cursor.saturating_sub(1),
                FormField::Duration => self.duration = cycle_duration(self.duration, -1),
                FormField::RecentlyWatched => {}
            },
            KeyCode::Right => match self.focus {
                FormField::Genres => {
                    self.genre_cursor = (self.genre_cursor + 1).min(GENRES.len() - 1);
                }
                FormField::Mood => {
                    self.mood_cursor = (self.mood_cursor + 1).min(MOODS.len() - 1);
                }
                FormField::Duration => self.duration = cycle_duration(self.duration, 1),
                FormField::RecentlyWatched => {}
            },
            KeyCode::Char(' ') if !typing => match self.focus {
                FormField::Genres => {
                    self.genres_selected[self.genre_cursor] = !self.genres_selected[self.genre_cursor];
                }
                FormField::Mood => {
                    // Picking the highlighted mood again clears it.
                    self.mood_selected = if self.mood_selected == Some(self.mood_cursor) {
                        None
                    } else {
                        Some(self.mood_cursor)
                    };
                }
                _ => {}
            },
            KeyCode::Backspace if typing => {
                self.recently_watched.pop();
            }
            KeyCode::Char(c) if typing => self.recently_watched.push(c),
            _ => {}
        }
    }

    fn on_results_key(&mut self, key: KeyCode) {
        let count = self.session.movies().len();
        match key {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('n') => {
                self.screen = Screen::Form;
            }
            KeyCode::Char('e') => self.export(),
            KeyCode::Enter if count > 0 => self.detail_open = true,
            KeyCode::Left => self.card_cursor = self.card_cursor.saturating_sub(1),
            KeyCode::Right if count > 0 => {
                self.card_cursor = (self.card_cursor + 1).min(count - 1);
            }
            KeyCode::Up => self.card_cursor = self.card_cursor.saturating_sub(GRID_COLS),
            KeyCode::Down if count > 0 => {
                self.card_cursor = (self.card_cursor + GRID_COLS).min(count - 1);
            }
            _ => {}
        }
    }

    /// Queue a search. Ignored while a request is already in flight, so a
    /// stale response can never land on top of a newer one.
    fn submit(&mut self) {
        if self.session.is_loading() {
            return;
        }
        self.session.begin();
        self.pending_submit = Some(self.preferences());
    }

    fn take_submit(&mut self) -> Option<UserPreferences> {
        self.pending_submit.take()
    }

    fn on_search_outcome(&mut self, outcome: SearchOutcome) {
        if !self.session.is_loading() {
            return;
        }
        self.session.finish(outcome);
        self.screen = Screen::Results;
        self.card_cursor = 0;
        self.detail_open = false;
    }

    fn export(&mut self) {
        match export_recommendations(self.session.movies(), &self.export_dir) {
            Ok(Some(path)) => self.status = Some(format!("Exported to {}", path.display())),
            Ok(None) => self.status = Some("Nothing to export.".to_string()),
            Err(err) => {
                tracing::error!(error = %err, "export failed");
                self.status = Some("Export failed; see the log.".to_string());
            }
        }
    }

    fn selected_movie(&self) -> Option<&Movie> {
        self.session.movies().get(self.card_cursor)
    }
}

fn cycle_duration(current: DurationPreference, step: isize) -> DurationPreference {
    let all = DurationPreference::all();
    let idx = all.iter().position(|d| *d == current).unwrap_or(0) as isize;
    let next = (idx + step).rem_euclid(all.len() as isize) as usize;
    all[next]
}

pub async fn run_tui(engine: RecommendationEngine, export_dir: PathBuf) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = run_app(&mut terminal, engine, export_dir);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    engine: RecommendationEngine,
    export_dir: PathBuf,
) -> Result<()> {
    let engine = Arc::new(engine);
    let (tx, mut rx) = mpsc::unbounded_channel::<SearchOutcome>();
    let mut app = App::new(export_dir);

    loop {
        while let Ok(outcome) = rx.try_recv() {
            app.on_search_outcome(outcome);
        }

        terminal.draw(|frame| ui(frame, &app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key.code);
                }
            }
        }

        if let Some(prefs) = app.take_submit() {
            let engine = engine.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let _ = tx.send(engine.get_recommendations(&prefs).await);
            });
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    match app.screen {
        Screen::Form => render_form(frame, main_layout[0], app),
        Screen::Results => render_results(frame, main_layout[0], app),
    }

    if app.detail_open {
        if let Some(movie) = app.selected_movie() {
            render_detail_overlay(frame, movie);
        }
    }

    render_hint_bar(frame, main_layout[1], app);
}

fn render_form(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            "CineMind",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Discover movies that understand you.",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    frame.render_widget(header, rows[0]);

    render_chip_row(
        frame,
        rows[1],
        " Favorite Genres ",
        GENRES,
        |i| app.genres_selected[i],
        app.genre_cursor,
        app.focus == FormField::Genres,
        Color::Cyan,
    );

    render_chip_row(
        frame,
        rows[2],
        " Current Mood ",
        MOODS,
        |i| app.mood_selected == Some(i),
        app.mood_cursor,
        app.focus == FormField::Mood,
        Color::Magenta,
    );

    let duration_focused = app.focus == FormField::Duration;
    let duration = Paragraph::new(Line::from(vec![
        Span::styled("◂ ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            app.duration.label(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ▸", Style::default().fg(Color::DarkGray)),
    ]))
    .block(
        Block::default()
            .title(" Duration ")
            .borders(Borders::ALL)
            .border_style(focus_style(duration_focused, Color::Yellow)),
    );
    frame.render_widget(duration, rows[3]);

    let typing = app.focus == FormField::RecentlyWatched;
    let input_text = if app.recently_watched.is_empty() && !typing {
        Span::styled(
            "e.g. I loved Interstellar and want something similar...",
            Style::default().fg(Color::DarkGray),
        )
    } else if typing {
        Span::styled(
            format!("{}_", app.recently_watched),
            Style::default().fg(Color::White),
        )
    } else {
        Span::styled(app.recently_watched.clone(), Style::default().fg(Color::White))
    };
    let input = Paragraph::new(Line::from(input_text)).block(
        Block::default()
            .title(" Recently Watched / Additional Context ")
            .borders(Borders::ALL)
            .border_style(focus_style(typing, Color::Green)),
    );
    frame.render_widget(input, rows[4]);

    if app.session.is_loading() {
        let loading = Paragraph::new(Span::styled(
            "Analyzing Profile...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(loading, rows[5]);
    }
}

#[allow(clippy::too_many_arguments)]
fn render_chip_row(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    items: &[&str],
    is_selected: impl Fn(usize) -> bool,
    cursor: usize,
    focused: bool,
    color: Color,
) {
    let mut spans = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let mut style = if is_selected(i) {
            Style::default().fg(Color::Black).bg(color)
        } else {
            Style::default().fg(Color::Gray)
        };
        if focused && i == cursor {
            style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }
        spans.push(Span::styled(format!(" {item} "), style));
        spans.push(Span::raw(" "));
    }
    let chips = Paragraph::new(Line::from(spans)).wrap(Wrap { trim: true }).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(focus_style(focused, color)),
    );
    frame.render_widget(chips, area);
}

fn render_results(frame: &mut Frame, area: Rect, app: &App) {
    match app.session.phase() {
        SearchPhase::Failed => {
            let banner = Paragraph::new(app.session.error().unwrap_or_default())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .title(" Error ")
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Red)),
                );
            frame.render_widget(banner, area);
        }
        SearchPhase::Empty => {
            let empty = Paragraph::new(vec![
                Line::from("No movies found tailored to this specific combination."),
                Line::from(Span::styled(
                    "Try broadening your criteria.",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .block(Block::default().title(" Results ").borders(Borders::ALL));
            frame.render_widget(empty, area);
        }
        _ => render_card_grid(frame, area, app),
    }
}

fn render_card_grid(frame: &mut Frame, area: Rect, app: &App) {
    let movies = app.session.movies();
    let cursor_row = app.card_cursor / GRID_COLS;
    let first_row = cursor_row.saturating_sub(GRID_ROWS - 1);

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    for (grid_row, row_area) in row_areas.iter().enumerate() {
        let col_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(33),
                Constraint::Percentage(34),
                Constraint::Percentage(33),
            ])
            .split(*row_area);
        for (grid_col, col_area) in col_areas.iter().enumerate() {
            let idx = (first_row + grid_row) * GRID_COLS + grid_col;
            if let Some(movie) = movies.get(idx) {
                render_card(frame, *col_area, movie, idx == app.card_cursor);
            }
        }
    }
}

fn render_card(frame: &mut Frame, area: Rect, movie: &Movie, selected: bool) {
    let border_style = if selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let genres = movie
        .genre
        .iter()
        .take(2)
        .map(|g| g.to_uppercase())
        .collect::<Vec<_>>()
        .join(" · ");

    let lines = vec![
        Line::from(vec![
            Span::styled(
                movie.year.to_string(),
                Style::default().fg(Color::Gray),
            ),
            Span::raw("  "),
            Span::styled(
                format!("★ {}", movie.rating),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw("  "),
            Span::styled(
                format!("{}% Match", movie.match_score),
                Style::default().fg(Color::Green),
            ),
        ]),
        Line::from(Span::styled(genres, Style::default().fg(Color::DarkGray))),
        Line::from(Span::styled(
            movie.reasoning.clone(),
            Style::default().fg(Color::Gray),
        )),
    ];

    let card = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .title(format!(" {} ", movie.title))
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(card, area);
}

fn render_detail_overlay(frame: &mut Frame, movie: &Movie) {
    let area = centered_rect(80, 80, frame.area());
    frame.render_widget(Clear, area);

    let genres = movie
        .genre
        .iter()
        .map(|g| format!("#{g}"))
        .collect::<Vec<_>>()
        .join(" ");

    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{}% Match", movie.match_score),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(movie.year.to_string(), Style::default().fg(Color::Gray)),
            Span::raw("  "),
            Span::styled(
                format!("★ {}", movie.rating),
                Style::default().fg(Color::Yellow),
            ),
        ]),
        Line::from(Span::styled(genres, Style::default().fg(Color::Cyan))),
        Line::default(),
        Line::from(Span::styled(
            "WHY WE PICKED THIS",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("\"{}\"", movie.reasoning),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::ITALIC),
        )),
        Line::default(),
        Line::from(Span::styled(
            "PLOT SUMMARY",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
        )),
        Line::from(movie.plot_summary.clone()),
        Line::default(),
        Line::from(vec![
            Span::styled("Director: ", Style::default().fg(Color::DarkGray)),
            Span::raw(movie.director.clone()),
        ]),
        Line::from(vec![
            Span::styled("Starring: ", Style::default().fg(Color::DarkGray)),
            Span::raw(movie.cast.join(", ")),
        ]),
        Line::from(vec![
            Span::styled("Poster: ", Style::default().fg(Color::DarkGray)),
            Span::styled(detail_poster_url(movie), Style::default().fg(Color::Blue)),
        ]),
    ];

    let detail = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .title(format!(" {} ({}) ", movie.title, movie.year))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(detail, area);
}

fn render_hint_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    let hint = |key: &str, action: &str| {
        [
            Span::styled(
                format!("[{key}]"),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" {action}  "), Style::default().fg(Color::DarkGray)),
        ]
    };

    match app.screen {
        Screen::Form => {
            spans.extend(hint("Tab", "field"));
            spans.extend(hint("←→", "move"));
            spans.extend(hint("Space", "pick"));
            spans.extend(hint("Enter", "search"));
            spans.extend(hint("q", "quit"));
        }
        Screen::Results => {
            spans.extend(hint("←→↑↓", "browse"));
            spans.extend(hint("Enter", "details"));
            spans.extend(hint("e", "export"));
            spans.extend(hint("n", "new search"));
            spans.extend(hint("q", "quit"));
        }
    }

    if app.session.is_loading() {
        spans.push(Span::styled(
            "Analyzing Profile... ",
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(status) = &app.status {
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::Green)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn focus_style(focused: bool, color: Color) -> Style {
    if focused {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
