//! Async tick source for a [`PomodoroEngine`].
//!
//! One tokio task owns the engine. Commands and ticks are handled strictly
//! one at a time inside that task, so engine state needs no lock.
//!
//! The ticker exists only while the engine is running: it is armed when the
//! engine enters the running state and dropped as soon as it leaves it, so
//! at most one tick source is ever live and a pause processed before the
//! next tick leaves nothing behind to fire.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval};

use super::engine::PomodoroEngine;
use super::mode::Mode;
use crate::error::{CoreError, Result};
use crate::events::{Event, Snapshot};

/// Event channel capacity. Slow subscribers lag rather than block the driver.
const EVENT_BUFFER: usize = 64;

/// Operations accepted by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetMode(Mode),
    Start,
    Pause,
    Reset,
    /// Stop the driver task and hand the engine back through its join handle.
    Shutdown,
}

struct Request {
    command: Command,
    reply: oneshot::Sender<Snapshot>,
}

/// Spawns the task that drives an engine.
#[derive(Debug, Clone, Copy)]
pub struct TimerDriver {
    period: Duration,
}

impl Default for TimerDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerDriver {
    pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

    pub fn new() -> Self {
        Self {
            period: Self::DEFAULT_PERIOD,
        }
    }

    /// Use a tick period other than one second.
    pub fn with_period(period: Duration) -> Self {
        Self { period }
    }

    /// Spawn the driver task on the current tokio runtime.
    ///
    /// The task ends on [`Command::Shutdown`] or when every handle is
    /// dropped; the join handle then yields the engine.
    pub fn spawn(self, engine: PomodoroEngine) -> (TimerHandle, JoinHandle<PomodoroEngine>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(engine.snapshot());
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);

        let handle = TimerHandle {
            commands: command_tx,
            state: state_rx,
            events: event_tx.clone(),
        };

        let task = tokio::spawn(run(engine, self.period, command_rx, state_tx, event_tx));
        (handle, task)
    }
}

/// Cloneable command surface and read model for a running driver.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    commands: mpsc::UnboundedSender<Request>,
    state: watch::Receiver<Snapshot>,
    events: broadcast::Sender<Event>,
}

impl TimerHandle {
    /// Send a command and wait until the driver has applied it.
    ///
    /// Returns the snapshot taken right after the command.
    ///
    /// # Errors
    /// Returns [`CoreError::DriverClosed`] if the driver task has ended.
    pub async fn send(&self, command: Command) -> Result<Snapshot> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Request { command, reply })
            .map_err(|_| CoreError::DriverClosed)?;
        response.await.map_err(|_| CoreError::DriverClosed)
    }

    pub async fn set_mode(&self, mode: Mode) -> Result<Snapshot> {
        self.send(Command::SetMode(mode)).await
    }

    pub async fn start(&self) -> Result<Snapshot> {
        self.send(Command::Start).await
    }

    pub async fn pause(&self) -> Result<Snapshot> {
        self.send(Command::Pause).await
    }

    pub async fn reset(&self) -> Result<Snapshot> {
        self.send(Command::Reset).await
    }

    pub async fn shutdown(&self) -> Result<Snapshot> {
        self.send(Command::Shutdown).await
    }

    /// Latest published state.
    pub fn snapshot(&self) -> Snapshot {
        self.state.borrow().clone()
    }

    /// Receiver that is notified on every state change.
    pub fn watch(&self) -> watch::Receiver<Snapshot> {
        self.state.clone()
    }

    /// Subscribe to engine events produced from now on.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }
}

async fn run(
    mut engine: PomodoroEngine,
    period: Duration,
    mut commands: mpsc::UnboundedReceiver<Request>,
    state: watch::Sender<Snapshot>,
    events: broadcast::Sender<Event>,
) -> PomodoroEngine {
    let mut ticker: Option<Interval> = None;

    loop {
        let mut reply = None;
        let mut stop = false;

        let event = tokio::select! {
            biased;

            request = commands.recv() => match request {
                Some(Request { command, reply: tx }) => {
                    reply = Some(tx);
                    match command {
                        Command::SetMode(mode) => engine.set_mode(mode),
                        Command::Start => engine.start(),
                        Command::Pause => engine.pause(),
                        Command::Reset => engine.reset(),
                        Command::Shutdown => {
                            stop = true;
                            engine.pause()
                        }
                    }
                }
                None => break,
            },
            _ = next_tick(&mut ticker) => engine.tick(),
        };

        sync_ticker(&engine, &mut ticker, period);

        if let Some(event) = event {
            // No subscribers is fine.
            let _ = events.send(event);
        }

        let snapshot = engine.snapshot();
        state.send_if_modified(|current| {
            if current.same_state(&snapshot) {
                false
            } else {
                *current = snapshot.clone();
                true
            }
        });

        if let Some(tx) = reply {
            let _ = tx.send(snapshot);
        }

        if stop {
            break;
        }
    }

    ticker.take();
    tracing::debug!(mode = %engine.mode(), "timer driver stopped");
    engine
}

/// Arm a fresh ticker on entering the running state, drop it on leaving.
fn sync_ticker(engine: &PomodoroEngine, ticker: &mut Option<Interval>, period: Duration) {
    match (engine.is_running(), ticker.is_some()) {
        (true, false) => {
            tracing::trace!("arming ticker");
            *ticker = Some(tokio::time::interval_at(Instant::now() + period, period));
        }
        (false, true) => {
            tracing::trace!("cancelling ticker");
            *ticker = None;
        }
        _ => {}
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
