use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use note2quiz::{
    app::{App, Command},
    client::{HttpQuizService, QuizService},
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    quiz::QuestionCount,
    runtime::{spawn_request, CrosstermEventSource, EventSource, FixedTicker, Runner, Ticker},
    ui,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};
use tracing::info;

const TICK_RATE_MS: u64 = 100;

/// turn a PDF of notes into a multiple-choice quiz or a short recap
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Upload a PDF of course notes to a quiz generation service, then take the generated multiple-choice quiz or read a short recap, all in the terminal."
)]
pub struct Cli {
    /// base URL of the quiz generation service
    #[clap(short = 's', long)]
    server: Option<String>,

    /// number of questions to ask for
    #[clap(short = 'q', long, value_enum)]
    questions: Option<QuestionCount>,

    /// give up on a request after this many seconds (default: wait for as long as it takes)
    #[clap(short = 't', long)]
    timeout: Option<u64>,

    /// PDF to select on startup
    #[clap(short = 'f', long)]
    file: Option<PathBuf>,

    /// where to write the log (default: ~/.local/state/note2quiz/note2quiz.log)
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// remember --server, --questions and --timeout as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Layer command line flags over the stored configuration
    fn apply(&self, mut config: Config) -> Config {
        if let Some(server) = &self.server {
            config.server_url = server.clone();
        }
        if let Some(questions) = self.questions {
            config.question_count = questions;
        }
        if self.timeout.is_some() {
            config.request_timeout_secs = self.timeout;
        }
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = cli.log_file.clone().or_else(logging::default_path) {
        if let Err(e) = logging::init(&path) {
            eprintln!("logging disabled, cannot open {}: {}", path.display(), e);
        }
    }

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    if cli.save_config {
        store.save(&config)?;
        info!("saved settings to {}", store.path().display());
    }
    info!("using service at {}", config.server_url);

    let service: Arc<dyn QuizService> = Arc::new(HttpQuizService::new(
        &config.server_url,
        config.request_timeout(),
    )?);

    let mut app = App::new(config.question_count);
    if let Some(file) = &cli.file {
        app.preselect(&file.to_string_lossy());
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let result = start_tui(&mut terminal, &mut app, &runner, service);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
    service: Arc<dyn QuizService>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        match app.handle(runner.step()) {
            Command::Idle => {}
            Command::Redraw => {
                terminal.draw(|f| ui::draw(app, f))?;
            }
            Command::Dispatch(request) => {
                spawn_request(request, Arc::clone(&service), runner.sender());
                terminal.draw(|f| ui::draw(app, f))?;
            }
            Command::Quit => break,
        }
    }

    info!("bye");
    Ok(())
}
