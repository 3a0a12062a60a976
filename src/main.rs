use std::{
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{error::ErrorKind, CommandFactory, Parser};
use codetype::{
    app::{App, ExitType},
    config::{Config, ConfigStore, FileConfigStore},
    excerpt::ExcerptSource,
    runtime::{CrosstermEventSource, EventSource, FixedTicker, Runner, Ticker},
};
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::info;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

/// practice typing real code in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type a short code excerpt character by character. Whitespace is drawn as visible glyphs, typos are shown in red, and raw and net words per minute are updated live while the window has focus."
)]
pub struct Cli {
    /// custom text to type
    #[clap(short = 'p', long, conflicts_with_all = ["file", "dir"])]
    prompt: Option<String>,

    /// type the contents of this file
    #[clap(short = 'f', long, conflicts_with = "dir")]
    file: Option<PathBuf>,

    /// pick a random excerpt from the files in this directory
    #[clap(short = 'd', long)]
    dir: Option<PathBuf>,

    /// skip excerpts larger than this many bytes
    #[clap(long)]
    max_size: Option<usize>,

    /// redraw interval in milliseconds
    #[clap(long)]
    tick_rate: Option<u64>,

    /// write the effective settings to the config file before starting
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    fn excerpt_source(&self) -> ExcerptSource {
        if let Some(prompt) = &self.prompt {
            ExcerptSource::Prompt(prompt.clone())
        } else if let Some(file) = &self.file {
            ExcerptSource::File(file.clone())
        } else if let Some(dir) = &self.dir {
            ExcerptSource::Dir(dir.clone())
        } else {
            ExcerptSource::Embedded
        }
    }

    /// Command line flags win over the stored config for this run
    fn apply_to(&self, mut cfg: Config) -> Config {
        if let Some(max_size) = self.max_size {
            cfg.max_excerpt_size = max_size;
        }
        if let Some(tick_rate) = self.tick_rate {
            cfg.tick_rate_ms = tick_rate;
        }
        cfg
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let cfg = cli.apply_to(store.load());
    if cli.save_config {
        store
            .save(&cfg)
            .with_context(|| format!("saving config to {}", store.path().display()))?;
        info!("saved config to {}", store.path().display());
    }

    let mut app = App::new(cli.excerpt_source(), &cfg)?;
    info!("typing {} ({} chars)", app.excerpt.name, app.excerpt.text.chars().count());

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(cfg.tick_rate_ms)),
    );
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        LeaveAlternateScreen,
    )?;
    terminal.show_cursor()?;

    if let Some(score) = app.session.score() {
        info!("last score for {}: {}", app.excerpt.name, score);
    }

    result
}

fn start_tui<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<()> {
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        match app.on_event(runner.step()) {
            ExitType::Continue(false) => continue,
            ExitType::Continue(true) => {}
            ExitType::Restart => app.restart()?,
            ExitType::New => app.next_excerpt()?,
            ExitType::Quit => break,
        }

        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }

    Ok(())
}
