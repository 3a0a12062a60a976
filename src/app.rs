use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::debug;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::excerpt::{Excerpt, ExcerptFilter, ExcerptSource};
use crate::key::Key;
use crate::runtime::AppEvent;
use crate::session::{Phase, TypingSession};
use crate::time_series::WpmSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Results,
}

/// What the event loop should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitType {
    /// keep going; redraw if true
    Continue(bool),
    /// type the same excerpt again
    Restart,
    /// pick another excerpt
    New,
    Quit,
}

/// Everything the terminal front-end needs: one session plus what feeds it
#[derive(Debug)]
pub struct App<C: Clock = SystemClock> {
    pub session: TypingSession<C>,
    pub excerpt: Excerpt,
    pub source: ExcerptSource,
    pub filter: ExcerptFilter,
    pub series: WpmSeries,
    pub state: AppState,
    pub show_live_score: bool,
}

impl App<SystemClock> {
    pub fn new(source: ExcerptSource, cfg: &Config) -> Result<Self> {
        Self::with_clock(source, cfg, SystemClock)
    }
}

impl<C: Clock> App<C> {
    pub fn with_clock(source: ExcerptSource, cfg: &Config, clock: C) -> Result<Self> {
        let filter = ExcerptFilter::from_config(cfg);
        let excerpt = source.resolve(&filter, &mut rand::thread_rng())?;

        let mut session = TypingSession::with_clock(clock);
        session.load_text(&excerpt.text)?;

        Ok(Self {
            session,
            excerpt,
            source,
            filter,
            series: WpmSeries::new(),
            state: AppState::Typing,
            show_live_score: cfg.show_live_score,
        })
    }

    /// Start the current excerpt over, keeping focus
    pub fn restart(&mut self) -> Result<()> {
        self.session.reset();
        self.session.load_text(&self.excerpt.text)?;
        self.series.clear();
        self.state = AppState::Typing;
        Ok(())
    }

    /// Swap in a freshly chosen excerpt
    pub fn next_excerpt(&mut self) -> Result<()> {
        self.excerpt = self.source.resolve(&self.filter, &mut rand::thread_rng())?;
        debug!("next excerpt: {}", self.excerpt.name);
        self.restart()
    }

    pub fn on_event(&mut self, event: AppEvent) -> ExitType {
        match event {
            AppEvent::Tick => self.on_tick(),
            AppEvent::FocusGained => {
                self.session.activate();
                ExitType::Continue(true)
            }
            AppEvent::FocusLost => {
                self.session.deactivate();
                ExitType::Continue(true)
            }
            AppEvent::Resize => ExitType::Continue(true),
            AppEvent::Closed => ExitType::Quit,
            AppEvent::Key(key) => self.on_key(key),
        }
    }

    fn on_tick(&mut self) -> ExitType {
        let running = self.state == AppState::Typing && self.session.stopwatch().is_running();
        if !running {
            return ExitType::Continue(false);
        }
        if let Some(score) = self.session.score() {
            self.series
                .sample(self.session.elapsed().as_secs_f64(), score.net_wpm);
        }
        ExitType::Continue(self.show_live_score)
    }

    fn on_key(&mut self, key: KeyEvent) -> ExitType {
        // AltGr arrives as CONTROL | ALT on some layouts and types `{` or `}`
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL)
            && !key.modifiers.contains(KeyModifiers::ALT);
        if key.code == KeyCode::Esc || (ctrl && key.code == KeyCode::Char('c')) {
            return ExitType::Quit;
        }

        match self.state {
            AppState::Typing => {
                // first key while unfocused only focuses, like clicking the text
                if !self.session.is_focused() {
                    self.session.activate();
                    return ExitType::Continue(true);
                }
                if ctrl {
                    return ExitType::Continue(false);
                }
                self.session.handle_key(Key::from(&key));
                if self.session.phase() == Phase::Finished {
                    debug!("finished {}: {:?}", self.excerpt.name, self.session.score());
                    self.state = AppState::Results;
                }
                ExitType::Continue(true)
            }
            AppState::Results => match key.code {
                KeyCode::Char('r') => ExitType::Restart,
                KeyCode::Char('n') => ExitType::New,
                KeyCode::Backspace => {
                    self.session.handle_backspace();
                    if self.session.phase() == Phase::Active {
                        self.state = AppState::Typing;
                    }
                    ExitType::Continue(true)
                }
                _ => ExitType::Continue(false),
            },
        }
    }
}
