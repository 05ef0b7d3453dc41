mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::{error, info};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use typeracer::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    race::{Race, RaceState},
    runtime::{CrosstermEventSource, InputEvent, InputEventSource, Runner},
    text_source::TextSource,
    view::{TypingInput, TypingView},
    RaceController,
};

/// race against the clock typing a passage word by word
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal typing race: type the passage word by word before the minute runs out."
)]
pub struct Cli {
    /// custom prompt to race
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// race the bundled quote with this index
    #[clap(short = 'q', long)]
    quote: Option<usize>,

    /// race this many generated sentences instead of a quote
    #[clap(short = 'f', long = "full-sentences")]
    sentences: Option<usize>,

    /// how often the race timer is checked, in milliseconds
    #[clap(long)]
    tick_rate_ms: Option<u64>,

    /// file to write logs to (level set with RUST_LOG)
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// save the given options as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Overrides the stored settings with the ones given on the command line.
    fn apply(&self, mut cfg: Config) -> Config {
        if let Some(ms) = self.tick_rate_ms {
            cfg.tick_rate_ms = ms;
        }
        if let Some(index) = self.quote {
            cfg.quote = Some(index);
            cfg.sentences = None;
        }
        if let Some(count) = self.sentences {
            cfg.sentences = Some(count);
            cfg.quote = None;
        }
        cfg
    }

    fn text_source(&self, cfg: &Config) -> TextSource {
        match &self.prompt {
            Some(prompt) => TextSource::Custom(prompt.clone()),
            None => cfg.text_source(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Waiting,
    Racing,
    Over,
}

#[derive(Debug)]
pub struct App {
    pub controller: RaceController<TypingView>,
    pub source: TextSource,
}

impl App {
    pub fn new(source: TextSource) -> Result<Self, Box<dyn Error>> {
        let mut controller = RaceController::new(TypingView::new());
        controller.setup_race(Race::new(source.generate()?)?);
        Ok(Self { controller, source })
    }

    pub fn state(&self) -> AppState {
        match self.controller.race().map(Race::state) {
            Some(RaceState::Running) => AppState::Racing,
            Some(RaceState::Over) => AppState::Over,
            Some(RaceState::Created) | None => AppState::Waiting,
        }
    }

    /// Sets up a fresh race, keeping the current passage when `same_text` is set.
    pub fn reset(&mut self, same_text: bool) -> Result<(), Box<dyn Error>> {
        let text = match (same_text, self.controller.race()) {
            (true, Some(race)) => race.text().to_string(),
            _ => self.source.generate()?,
        };
        self.controller.setup_race(Race::new(text)?);
        Ok(())
    }

    fn edit_input(
        &mut self,
        edit: impl FnOnce(&mut TypingInput) -> bool,
    ) -> Result<(), Box<dyn Error>> {
        let input = &mut self.controller.view_mut().input;
        if edit(input) {
            let text = input.text().to_string();
            self.controller.handle_typed_chars(&text)?;
        }
        Ok(())
    }

    /// Handles a key press, returning false when the app should quit.
    pub fn on_key(&mut self, key: KeyEvent) -> Result<bool, Box<dyn Error>> {
        if key.kind != KeyEventKind::Press {
            return Ok(true);
        }

        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Ok(false);
        }

        match (self.state(), key.code) {
            (AppState::Waiting, KeyCode::Enter) => self.controller.start_game()?,
            (AppState::Racing, KeyCode::Backspace) => self.edit_input(|input| input.pop())?,
            (AppState::Racing, _) => {
                if let Some(c) = typed_char(key) {
                    self.edit_input(|input| input.push(c))?;
                }
            }
            (AppState::Over, KeyCode::Char('r')) => self.reset(true)?,
            (AppState::Over, KeyCode::Char('n')) => self.reset(false)?,
            _ => {}
        }

        Ok(true)
    }
}

/// The character a key types into the race input. Enter and Tab type the
/// whitespace that ends a word on a line or tab break.
fn typed_char(key: KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c) if key.modifiers.difference(KeyModifiers::SHIFT).is_empty() => Some(c),
        KeyCode::Enter => Some('\n'),
        KeyCode::Tab => Some('\t'),
        _ => None,
    }
}

fn init_logging(path: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let Some(path) = path.or_else(AppDirs::log_path) else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    // logs never go to the terminal, it is in raw mode on the alternate screen
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_secs()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    if let Err(e) = init_logging(cli.log_file.clone()) {
        eprintln!("typeracer: logging disabled: {e}");
    }

    let store = FileConfigStore::new();
    let cfg = cli.apply(store.load());
    if cli.save_config {
        store.save(&cfg)?;
        info!("saved config to {}", store.path().display());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = App::new(cli.text_source(&cfg))?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(cfg.tick_rate_ms),
    );
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        error!("race loop failed: {e}");
    }
    result
}

fn start_tui<B: Backend, E: InputEventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        match runner.step(app.controller.deadline()) {
            InputEvent::Tick(now) => {
                if app.state() == AppState::Racing {
                    app.controller.handle_tick(now)?;
                    terminal.draw(|f| f.render_widget(&*app, f.area()))?;
                }
            }
            InputEvent::Resize => {
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
            InputEvent::Key(key) => {
                if !app.on_key(key)? {
                    break;
                }
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
        }
    }

    Ok(())
}
