mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use photorush::{
    app_dirs::AppDirs,
    classifier::FileNameClassifier,
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    picker::{spawn_load, Photo, PhotoBrowser, PhotoLibrary},
    runtime::{
        ChannelCountdown, Countdown, CrosstermEventSource, FixedTicker, GameEvent, Runner,
        FRAME_INTERVAL,
    },
    session::{GameSession, ScoringRule, Status},
    words::{WordList, WordSet},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::mpsc::Sender,
};

/// find a photo that matches the word before the clock runs out
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A photo album word hunt: a random word appears, you pick a photo from your album, and a classifier guesses what is in it. Every guess that contains the word scores 20 points."
)]
pub struct Cli {
    /// directory to pick photos from (default: your pictures folder)
    #[clap(long)]
    photos: Option<PathBuf>,

    /// use the short demo word list, suited to a stock photo album
    #[clap(long)]
    demo: bool,

    /// length of a game in seconds
    #[clap(short = 't', long, value_parser = clap::value_parser!(u32).range(1..))]
    time_limit: Option<u32>,

    /// when a match scores: on every new matching word or photo, or only on a fresh match
    #[clap(long, value_enum)]
    scoring: Option<ScoringRule>,

    /// remember these options for next time
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Layers the command line flags over the stored configuration
    fn apply(&self, mut config: Config) -> Config {
        if let Some(photos) = &self.photos {
            config.photos_dir = Some(photos.clone());
        }
        if self.demo {
            config.word_set = WordSet::Demo;
        }
        if let Some(secs) = self.time_limit {
            config.time_limit_secs = secs;
        }
        if let Some(scoring) = self.scoring {
            config.scoring = scoring;
        }
        config
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Home,
    Playing,
    Picking,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Control {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub config: Config,
    pub words: WordList,
    pub session: GameSession,
    pub library: PhotoLibrary,
    pub browser: Option<PhotoBrowser>,
    pub show_instructions: bool,
    pub loading: bool,
    pub last_photo: Option<String>,
}

impl App {
    pub fn new(config: Config, countdown: Box<dyn Countdown>) -> Self {
        let session = GameSession::new(
            config.session_config(),
            Box::new(FileNameClassifier),
            countdown,
        );

        Self {
            words: config.word_set.load(),
            library: PhotoLibrary::new(config.photos_dir()),
            session,
            config,
            browser: None,
            show_instructions: false,
            loading: false,
            last_photo: None,
        }
    }

    pub fn state(&self) -> AppState {
        match self.session.status() {
            Status::NotStarted => AppState::Home,
            Status::Running if self.browser.is_some() => AppState::Picking,
            Status::Running => AppState::Playing,
            Status::Over => AppState::GameOver,
        }
    }

    fn toggle_word_set(&mut self) {
        self.config.word_set = self.config.word_set.toggled();
        self.words = self.config.word_set.load();
    }

    fn play_again(&mut self) {
        self.session.reset();
        self.browser = None;
        self.loading = false;
        self.last_photo = None;
    }

    /// A picker completion posted back onto the event loop
    fn on_picked(&mut self, generation: u64, photo: Option<Photo>) {
        match self.session.on_picked(generation, photo.as_ref()) {
            Ok(_) => {
                self.loading = false;
                if let Some(photo) = &photo {
                    self.last_photo = Some(photo.file_name());
                }
            }
            Err(e) => log::debug!("dropping picked photo: {e}"),
        }
    }

    fn cancel_pick(&mut self) {
        self.browser = None;
        let generation = self.session.countdown().generation();
        self.on_picked(generation, None);
    }

    fn on_event(&mut self, event: GameEvent, tx: &Sender<GameEvent>) -> Control {
        match event {
            GameEvent::Key(key) => return self.on_key(key, tx),
            GameEvent::Countdown(generation) => {
                if let Ok(Status::Over) = self.session.on_countdown(generation) {
                    self.browser = None;
                }
            }
            GameEvent::Picked(generation, photo) => self.on_picked(generation, photo),
            GameEvent::Tick | GameEvent::Resize => {}
        }
        Control::Continue
    }

    fn on_key(&mut self, key: KeyEvent, tx: &Sender<GameEvent>) -> Control {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }

        match self.state() {
            AppState::Home => match key.code {
                KeyCode::Esc => return Control::Quit,
                KeyCode::Enter | KeyCode::Char('s') => {
                    if let Err(e) = self.session.start(self.words.words.as_slice()) {
                        log::warn!("couldn't start a game: {e}");
                    }
                }
                KeyCode::Char('i') => self.show_instructions = !self.show_instructions,
                KeyCode::Char('d') => self.toggle_word_set(),
                _ => {}
            },
            AppState::Playing => match key.code {
                KeyCode::Esc => return Control::Quit,
                KeyCode::Char('p') if !self.loading => {
                    self.browser = Some(PhotoBrowser::open(&self.library));
                }
                KeyCode::Char('n') => {
                    if let Err(e) = self.session.new_word(self.words.words.as_slice()) {
                        log::warn!("couldn't draw a new word: {e}");
                    }
                }
                _ => {}
            },
            AppState::Picking => match key.code {
                KeyCode::Esc => self.cancel_pick(),
                KeyCode::Up | KeyCode::Char('k') => {
                    if let Some(browser) = self.browser.as_mut() {
                        browser.previous();
                    }
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if let Some(browser) = self.browser.as_mut() {
                        browser.next();
                    }
                }
                KeyCode::Enter => {
                    let picked = self
                        .browser
                        .take()
                        .and_then(|b| b.current().map(|p| p.to_path_buf()));
                    match picked {
                        Some(path) => {
                            self.loading = true;
                            let generation = self.session.countdown().generation();
                            spawn_load(path, generation, tx.clone());
                        }
                        None => self.cancel_pick(),
                    }
                }
                _ => {}
            },
            AppState::GameOver => match key.code {
                KeyCode::Esc => return Control::Quit,
                KeyCode::Char('r') | KeyCode::Enter => self.play_again(),
                _ => {}
            },
        }
        Control::Continue
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(log_path) = AppDirs::log_path() {
        logging::init(&log_path)?;
    }

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    if cli.save_config {
        store.save(&config)?;
        log::info!("saved config to {}", store.path().display());
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = CrosstermEventSource::new();
    let tx = events.sender();
    let mut app = App::new(config, Box::new(ChannelCountdown::new(tx.clone())));
    let runner = Runner::new(events, FixedTicker::new(FRAME_INTERVAL));

    let result = start_tui(&mut terminal, &mut app, &runner, &tx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<CrosstermEventSource, FixedTicker>,
    tx: &Sender<GameEvent>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui(app, f))?;

        if app.on_event(runner.step(), tx) == Control::Quit {
            break;
        }
    }

    app.session.reset();
    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    f.render_widget(&*app, f.area());
}
