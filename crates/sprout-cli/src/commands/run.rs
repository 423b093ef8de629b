//! Interactive countdown.
//!
//! Commands are read from stdin, one per line, while the driver ticks in the
//! background. Every state change prints a status line.

use std::io::Write;

use clap::Args;
use sprout_core::display::status_line;
use sprout_core::{Command, Config, Event, Mode, Snapshot, TimerDriver};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;

use super::open_engine;

const HELP: &str = "commands: s(tart) p(ause) t(oggle) r(eset) focus short long q(uit)";

#[derive(Args)]
pub struct RunArgs {
    /// Switch to this mode before starting
    #[arg(long)]
    pub mode: Option<Mode>,
    /// Start the countdown immediately
    #[arg(long)]
    pub start: bool,
}

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Send(Command),
    Toggle,
    Help,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    let word = line.trim().to_lowercase();
    let input = match word.as_str() {
        "s" | "start" => Input::Send(Command::Start),
        "p" | "pause" => Input::Send(Command::Pause),
        "r" | "reset" => Input::Send(Command::Reset),
        "t" | "toggle" | "" => Input::Toggle,
        "h" | "help" | "?" => Input::Help,
        "q" | "quit" | "exit" => Input::Quit,
        other => Input::Send(Command::SetMode(other.parse::<Mode>().ok()?)),
    };
    Some(input)
}

struct Renderer {
    bar_width: usize,
    stages: u32,
    bell: bool,
}

impl Renderer {
    fn new(config: &Config) -> Self {
        Self {
            bar_width: config.ui.bar_width as usize,
            stages: config.ui.growth_stages,
            bell: config.notifications.enabled,
        }
    }

    fn snapshot(&self, out: &mut impl Write, snapshot: &Snapshot) -> std::io::Result<()> {
        writeln!(out, "{}", status_line(snapshot, self.bar_width, self.stages))
    }

    fn event(&self, out: &mut impl Write, event: &Event) -> std::io::Result<()> {
        if let Event::SessionCompleted {
            mode, next_mode, ..
        } = event
        {
            writeln!(out, "{} finished. Up next: {}.", mode.label(), next_mode.label())?;
            if self.bell {
                write!(out, "\x07")?;
                out.flush()?;
            }
        }
        Ok(())
    }
}

/// Output produced by the driver between two user inputs.
#[derive(Debug)]
enum Update {
    Event(Event),
    Snapshot(Snapshot),
    Closed,
}

/// Wait for the next event or state change.
///
/// Events win over snapshots, so a completion notice comes out before the
/// snapshot of the mode it switched to.
async fn next_update(
    events: &mut broadcast::Receiver<Event>,
    state: &mut watch::Receiver<Snapshot>,
) -> Update {
    loop {
        tokio::select! {
            biased;

            event = events.recv() => match event {
                Ok(event) => return Update::Event(event),
                Err(RecvError::Lagged(missed)) => {
                    tracing::debug!(missed, "event subscriber lagged");
                }
                Err(RecvError::Closed) => return Update::Closed,
            },
            changed = state.changed() => {
                if changed.is_err() {
                    return Update::Closed;
                }
                return Update::Snapshot(state.borrow_and_update().clone());
            }
        }
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_session(args))
}

async fn run_session(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let renderer = Renderer::new(&config);

    let (handle, task) = TimerDriver::new().spawn(open_engine(&config));
    let mut state = handle.watch();
    let mut events = handle.events();

    if let Some(mode) = args.mode {
        handle.set_mode(mode).await?;
    }
    if args.start {
        handle.start().await?;
    }

    let mut out = std::io::stdout();
    writeln!(out, "{HELP}")?;
    renderer.snapshot(&mut out, &state.borrow_and_update())?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            biased;

            update = next_update(&mut events, &mut state) => match update {
                Update::Event(event) => renderer.event(&mut out, &event)?,
                Update::Snapshot(snapshot) => renderer.snapshot(&mut out, &snapshot)?,
                Update::Closed => break,
            },
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Some(Input::Send(command)) => {
                        handle.send(command).await?;
                    }
                    Some(Input::Toggle) => {
                        let command = if handle.snapshot().running {
                            Command::Pause
                        } else {
                            Command::Start
                        };
                        handle.send(command).await?;
                    }
                    Some(Input::Help) => writeln!(out, "{HELP}")?,
                    Some(Input::Quit) => break,
                    None => eprintln!("unknown command: {}", line.trim()),
                }
            }
        }
    }

    handle.shutdown().await?;
    let engine = task.await?;
    tracing::debug!(mode = %engine.mode(), "session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprout_core::{PomodoroEngine, Preferences};
    use std::time::Duration;

    #[test]
    fn parses_short_and_long_forms() {
        assert_eq!(parse_input("s"), Some(Input::Send(Command::Start)));
        assert_eq!(parse_input(" PAUSE "), Some(Input::Send(Command::Pause)));
        assert_eq!(parse_input("r"), Some(Input::Send(Command::Reset)));
        assert_eq!(parse_input("q"), Some(Input::Quit));
        assert_eq!(parse_input(""), Some(Input::Toggle));
        assert_eq!(parse_input("?"), Some(Input::Help));
    }

    #[test]
    fn parses_mode_names() {
        assert_eq!(
            parse_input("long"),
            Some(Input::Send(Command::SetMode(Mode::Long)))
        );
        assert_eq!(
            parse_input("Short"),
            Some(Input::Send(Command::SetMode(Mode::Short)))
        );
    }

    #[test]
    fn rejects_unknown_words() {
        assert_eq!(parse_input("grow"), None);
    }

    fn renderer(bell: bool) -> Renderer {
        Renderer {
            bar_width: 4,
            stages: 5,
            bell,
        }
    }

    fn completed(mode: Mode) -> Event {
        Event::SessionCompleted {
            mode,
            next_mode: mode.next(),
            seconds_left: 0,
            at: chrono::Utc::now(),
        }
    }

    fn render_event(renderer: &Renderer, event: &Event) -> String {
        let mut out = Vec::new();
        renderer.event(&mut out, event).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn completion_names_finished_and_next_mode() {
        let text = render_event(&renderer(false), &completed(Mode::Focus));
        assert_eq!(text, "Focus finished. Up next: Short break.\n");

        let text = render_event(&renderer(false), &completed(Mode::Long));
        assert_eq!(text, "Long break finished. Up next: Focus.\n");
    }

    #[test]
    fn bell_rings_only_when_enabled() {
        let text = render_event(&renderer(true), &completed(Mode::Short));
        assert!(text.ends_with('\x07'));

        let text = render_event(&renderer(false), &completed(Mode::Short));
        assert!(!text.contains('\x07'));
    }

    #[test]
    fn other_events_print_nothing() {
        let event = Event::TimerStarted {
            mode: Mode::Focus,
            seconds_left: 1500,
            at: chrono::Utc::now(),
        };
        assert!(render_event(&renderer(true), &event).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn completion_event_comes_before_its_snapshot() {
        let engine = PomodoroEngine::new(Preferences::in_memory());
        let (handle, _task) = TimerDriver::new().spawn(engine);
        let mut events = handle.events();
        let mut state = handle.watch();

        handle.set_mode(Mode::Short).await.unwrap();
        handle.start().await.unwrap();
        state.borrow_and_update();
        while events.try_recv().is_ok() {}

        tokio::time::sleep(Duration::from_millis(300_500)).await;

        let first = next_update(&mut events, &mut state).await;
        assert!(
            matches!(
                first,
                Update::Event(Event::SessionCompleted {
                    mode: Mode::Short,
                    next_mode: Mode::Focus,
                    ..
                })
            ),
            "got {first:?}"
        );
        let second = next_update(&mut events, &mut state).await;
        match second {
            Update::Snapshot(snapshot) => {
                assert_eq!(snapshot.mode, Mode::Focus);
                assert!(!snapshot.running);
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn closed_driver_ends_updates() {
        let engine = PomodoroEngine::new(Preferences::in_memory());
        let (handle, task) = TimerDriver::new().spawn(engine);
        let mut events = handle.events();
        let mut state = handle.watch();
        state.borrow_and_update();

        handle.shutdown().await.unwrap();
        drop(handle);
        task.await.unwrap();

        assert!(matches!(
            next_update(&mut events, &mut state).await,
            Update::Closed
        ));
    }

    #[test]
    fn snapshot_prints_one_status_line() {
        let snapshot = Snapshot {
            mode: Mode::Short,
            running: false,
            seconds_left: 300,
            total_secs: 300,
            progress: 0.0,
            at: chrono::Utc::now(),
        };
        let mut out = Vec::new();
        renderer(true).snapshot(&mut out, &snapshot).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "05:00 Short break [----] sprout 1/5 (paused)\n");
    }
}
