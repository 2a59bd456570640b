//! TUI runtime: owns the terminal, runs the event loop, executes effects.
//!
//! All side effects happen here. The reducer stays pure and produces
//! effects; handlers perform the I/O and send result events to the inbox,
//! which is drained once per loop iteration.

mod handlers;
mod inbox;

use std::future::Future;
use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use inbox::{UiEventReceiver, UiEventSender};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use scorelinks_core::clipboard::ClipboardSink;
use scorelinks_core::{AuthService, LinkDirectory, interrupt};
use tokio::sync::mpsc;

use crate::common::{TaskCompleted, TaskId, TaskKind, TaskStarted};
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::{render, terminal, update};

/// Tick interval while a request is in flight or a timed flag is showing.
pub const FRAME_DURATION: Duration = Duration::from_millis(50);

/// Tick interval when idle.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(250);

/// Services the effect handlers run against.
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub links: LinkDirectory,
    pub clipboard: Arc<dyn ClipboardSink>,
}

/// Full-screen TUI runtime.
///
/// Terminal state is restored on drop, panic, or a forced Ctrl+C exit.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    services: Services,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    last_tick: Instant,
}

impl TuiRuntime {
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be set up.
    pub fn new(state: AppState, services: Services) -> Result<Self> {
        // Panic hook goes in before the alternate screen.
        terminal::install_panic_hook();
        interrupt::set_restore_hook(|| {
            let _ = terminal::restore_terminal();
        });
        interrupt::reset();

        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        Ok(Self {
            terminal,
            state,
            services,
            inbox_tx,
            inbox_rx,
            last_tick: Instant::now(),
        })
    }

    /// Runs until the user quits.
    ///
    /// # Errors
    /// Returns terminal I/O errors.
    pub fn run(&mut self) -> Result<()> {
        self.execute_effect(UiEffect::RestoreSession);

        let mut dirty = true;
        while !self.state.tui.should_quit {
            if interrupt::is_interrupted() {
                tracing::debug!("interrupted, quitting");
                self.state.tui.should_quit = true;
                break;
            }

            let events = self.collect_events()?;
            if !events.is_empty() {
                dirty = true;
            }
            for event in events {
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| render::render(&self.state, frame))?;
                dirty = false;
            }
        }

        Ok(())
    }

    // ========================================================================
    // Event Collection
    // ========================================================================

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        let needs_fast_tick = self.state.tui.tasks.is_any_running()
            || self.state.tui.auth.is_loading()
            || self.state.tui.links.copied.is_some();
        let tick_interval = if needs_fast_tick {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        // Don't delay already-collected events waiting for input.
        let poll_duration = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    // ========================================================================
    // Effect Dispatch
    // ========================================================================

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    fn dispatch_event(&mut self, event: UiEvent) {
        let effects = update::update(&mut self.state, event);
        if !effects.is_empty() {
            self.execute_effects(effects);
        }
    }

    /// Spawns a handler whose result event goes straight to the inbox.
    fn spawn_effect<Fut>(&self, fut: Fut)
    where
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(fut.await);
        });
    }

    /// Spawns a handler wrapped in the TaskStarted/TaskCompleted lifecycle.
    fn spawn_task<Fut>(&self, kind: TaskKind, id: TaskId, fut: Fut)
    where
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        let _ = tx.send(UiEvent::TaskStarted {
            kind,
            started: TaskStarted { id },
        });
        tokio::spawn(async move {
            let completed = TaskCompleted {
                id,
                result: Box::new(fut.await),
            };
            let _ = tx.send(UiEvent::TaskCompleted { kind, completed });
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.tui.should_quit = true;
            }
            UiEffect::RestoreSession => {
                self.spawn_effect(handlers::restore_session(self.services.auth.clone()));
            }
            UiEffect::Login { task, credentials } => {
                let Some(task) = task else {
                    return;
                };
                let auth = self.services.auth.clone();
                self.spawn_task(TaskKind::Login, task, handlers::login(auth, credentials));
            }
            UiEffect::Logout => handlers::logout(&self.services.auth),
            UiEffect::RefreshUser { task } => {
                let Some(task) = task else {
                    return;
                };
                let auth = self.services.auth.clone();
                self.spawn_task(TaskKind::RefreshUser, task, handlers::refresh_user(auth));
            }
            UiEffect::FetchLinks { task } => {
                let Some(task) = task else {
                    return;
                };
                let links = self.services.links.clone();
                self.spawn_task(TaskKind::LinksFetch, task, handlers::fetch_links(links));
            }
            UiEffect::ApplyLinkMutation {
                task,
                mutation,
                origin,
            } => {
                let Some(task) = task else {
                    return;
                };
                let links = self.services.links.clone();
                self.spawn_task(
                    TaskKind::LinkMutation,
                    task,
                    handlers::apply_mutation(links, mutation, origin),
                );
            }
            UiEffect::CopyToClipboard { link } => {
                let event = handlers::copy_link(&link, self.services.clipboard.as_ref());
                self.dispatch_event(event);
            }
            UiEffect::OpenBrowser { url } => {
                if let Err(err) = open::that(&url) {
                    tracing::warn!(url, "failed to open browser: {err}");
                }
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
