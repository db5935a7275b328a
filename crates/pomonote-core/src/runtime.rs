//! Coordinating loop.
//!
//! Ticks, user commands and note-change notifications all arrive on one
//! queue and are applied to the [`Timer`] one at a time by [`run`], which is
//! the timer's only writer. Producers never touch the timer; they only send
//! [`Input`]s.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::notes::NoteStore;
use crate::timer::{Clock, Mode, Outcome, Timer, IDLE_STATUS};

/// A user gesture, as the host's command palette would deliver it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    StartPomo,
    /// Raw text from the custom length prompt.
    StartCustom(String),
    TogglePause,
    Quit,
    RibbonClick,
    /// Show where completed pomodoros are logged.
    OpenLog,
    ShowChecklist,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCommandError(pub String);

impl std::fmt::Display for ParseCommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown command '{}' (expected start, custom <minutes>, pause, quit, click, log, checklist)",
            self.0
        )
    }
}

impl std::error::Error for ParseCommandError {}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (word, rest) = s.split_once(char::is_whitespace).unwrap_or((s, ""));
        match word.to_ascii_lowercase().as_str() {
            "start" => Ok(Command::StartPomo),
            "custom" => Ok(Command::StartCustom(rest.trim().to_string())),
            "pause" | "resume" => Ok(Command::TogglePause),
            "quit" | "stop" => Ok(Command::Quit),
            "click" => Ok(Command::RibbonClick),
            "log" => Ok(Command::OpenLog),
            "checklist" => Ok(Command::ShowChecklist),
            _ => Err(ParseCommandError(s.to_string())),
        }
    }
}

/// Everything the loop reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Refresh the status text.
    Tick,
    Command(Command),
    /// The note store reports a change to this vault-relative path.
    FileModified(PathBuf),
    Shutdown,
}

/// Where the loop sends what the user should see.
pub trait StatusSink {
    /// New status bar text. Only called when the text changes.
    fn set_text(&mut self, text: &str);

    /// Events and warnings produced by an input.
    fn on_outcome(&mut self, _outcome: &Outcome) {}

    /// Reply to an informational command.
    fn show(&mut self, _message: &str) {}
}

/// Apply inputs until `Shutdown` arrives or every sender is gone, then force
/// the timer idle and hand it back.
pub async fn run<S, C, K>(
    mut timer: Timer<S, C>,
    mut inputs: mpsc::Receiver<Input>,
    sink: &mut K,
) -> Timer<S, C>
where
    S: NoteStore,
    C: Clock,
    K: StatusSink,
{
    let mut last_text: Option<String> = None;

    while let Some(input) = inputs.recv().await {
        // An interval that ran out since the last tick completes (and is
        // logged) before the input applies to it.
        if input != Input::Tick {
            let settled = timer.tick().await;
            report(sink, &settled);
        }

        match input {
            Input::Tick => {}
            Input::Command(command) => {
                let outcome = apply(&mut timer, command, sink).await;
                report(sink, &outcome);
            }
            Input::FileModified(path) => {
                let outcome = timer.on_file_modify(&path).await;
                report(sink, &outcome);
            }
            Input::Shutdown => break,
        }

        // Every input refreshes the status, so a command shows up without
        // waiting for the next tick.
        let status = timer.refresh().await;
        report(sink, &status.outcome);
        if last_text.as_deref() != Some(status.text.as_str()) {
            sink.set_text(&status.text);
            last_text = Some(status.text);
        }
    }

    // The channel can close without a Shutdown input.
    let settled = timer.tick().await;
    report(sink, &settled);
    let outcome = timer.shutdown();
    report(sink, &outcome);
    if last_text.as_deref() != Some(IDLE_STATUS) {
        sink.set_text(IDLE_STATUS);
    }
    timer
}

async fn apply<S, C, K>(timer: &mut Timer<S, C>, command: Command, sink: &mut K) -> Outcome
where
    S: NoteStore,
    C: Clock,
    K: StatusSink,
{
    tracing::debug!(?command, mode = %timer.mode(), "command");
    match command {
        Command::StartPomo => timer.start_timer(Mode::Pomo),
        Command::StartCustom(raw) => timer.start_custom_timer_from_input(&raw),
        // Pause and quit are only offered while an interval is active.
        Command::TogglePause | Command::Quit if timer.mode() == Mode::NoTimer => Outcome::none(),
        Command::TogglePause => timer.toggle_pause(),
        Command::Quit => timer.quit_timer(),
        Command::RibbonClick if !timer.config().ui.ribbon_icon => Outcome::none(),
        Command::RibbonClick => timer.on_ribbon_icon_click(),
        Command::OpenLog => {
            let message = match timer.log_target_path() {
                Ok(Some(path)) => format!("log: {}", path.display()),
                Ok(None) => "logging is disabled".to_string(),
                Err(e) => format!("log target unavailable: {e}"),
            };
            sink.show(&message);
            Outcome::none()
        }
        Command::ShowChecklist => {
            match timer.checklist_contents().await {
                Some(content) => sink.show(&content),
                None => sink.show("no checklist"),
            }
            Outcome::none()
        }
    }
}

fn report<K: StatusSink>(sink: &mut K, outcome: &Outcome) {
    if !outcome.is_noop() {
        sink.on_outcome(outcome);
    }
}

/// Send `Input::Tick` every `period` until the loop goes away.
///
/// Ticks that find the queue full are dropped; remaining time is computed
/// from timestamps, so a missed tick only delays the display.
pub fn spawn_ticker(tx: mpsc::Sender<Input>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            match tx.try_send(Input::Tick) {
                Ok(()) | Err(mpsc::error::TrySendError::Full(_)) => {}
                Err(mpsc::error::TrySendError::Closed(_)) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;
    use crate::notes::MemoryStore;
    use crate::storage::Config;
    use crate::timer::ManualClock;

    #[derive(Default)]
    struct Recorder {
        texts: Vec<String>,
        events: Vec<Event>,
        messages: Vec<String>,
    }

    impl StatusSink for Recorder {
        fn set_text(&mut self, text: &str) {
            self.texts.push(text.to_string());
        }

        fn on_outcome(&mut self, outcome: &Outcome) {
            self.events.extend(outcome.events.iter().cloned());
        }

        fn show(&mut self, message: &str) {
            self.messages.push(message.to_string());
        }
    }

    fn new_timer() -> (Timer<MemoryStore, ManualClock>, ManualClock) {
        let clock = ManualClock::default();
        let timer = Timer::new(Config::default(), MemoryStore::new(), clock.clone());
        (timer, clock)
    }

    #[test]
    fn parses_commands() {
        assert_eq!("start".parse::<Command>().unwrap(), Command::StartPomo);
        assert_eq!(
            " custom 10 ".parse::<Command>().unwrap(),
            Command::StartCustom("10".into())
        );
        assert_eq!(
            "custom".parse::<Command>().unwrap(),
            Command::StartCustom(String::new())
        );
        assert_eq!("PAUSE".parse::<Command>().unwrap(), Command::TogglePause);
        assert_eq!("quit".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!("click".parse::<Command>().unwrap(), Command::RibbonClick);
        assert_eq!("log".parse::<Command>().unwrap(), Command::OpenLog);
        assert!("dance".parse::<Command>().is_err());
    }

    #[tokio::test]
    async fn applies_inputs_in_order_and_quits_on_shutdown() {
        let (timer, _clock) = new_timer();
        let (tx, rx) = mpsc::channel(16);
        tx.send(Input::Command(Command::StartPomo)).await.unwrap();
        tx.send(Input::Tick).await.unwrap();
        tx.send(Input::Command(Command::TogglePause)).await.unwrap();
        tx.send(Input::Shutdown).await.unwrap();

        let mut sink = Recorder::default();
        let timer = run(timer, rx, &mut sink).await;

        assert_eq!(timer.mode(), Mode::NoTimer);
        assert_eq!(sink.texts, vec!["🍅 25:00", "🍅 25:00 ⏸", ""]);
        assert!(matches!(sink.events[0], Event::TimerStarted { .. }));
        assert!(matches!(sink.events[1], Event::TimerPaused { .. }));
        assert!(matches!(sink.events.last(), Some(Event::TimerQuit { .. })));
    }

    #[tokio::test]
    async fn stops_when_senders_drop() {
        let (timer, _clock) = new_timer();
        let (tx, rx) = mpsc::channel(4);
        tx.send(Input::Command(Command::RibbonClick)).await.unwrap();
        drop(tx);

        let mut sink = Recorder::default();
        let timer = run(timer, rx, &mut sink).await;
        assert_eq!(timer.mode(), Mode::NoTimer);
    }

    #[tokio::test]
    async fn gated_commands_are_ignored_when_idle() {
        let (timer, _clock) = new_timer();
        let (tx, rx) = mpsc::channel(4);
        tx.send(Input::Command(Command::TogglePause)).await.unwrap();
        tx.send(Input::Command(Command::Quit)).await.unwrap();
        tx.send(Input::Shutdown).await.unwrap();

        let mut sink = Recorder::default();
        let timer = run(timer, rx, &mut sink).await;
        assert!(sink.events.is_empty());
        assert!(!timer.is_paused());
    }

    #[tokio::test]
    async fn tick_completes_expired_interval() {
        let (mut timer, clock) = new_timer();
        timer.start_custom_timer(1);
        clock.advance(chrono::Duration::seconds(61));

        let (tx, rx) = mpsc::channel(4);
        tx.send(Input::Tick).await.unwrap();
        drop(tx);

        let mut sink = Recorder::default();
        let timer = run(timer, rx, &mut sink).await;

        assert!(sink.events.iter().any(|e| matches!(
            e,
            Event::IntervalCompleted {
                mode: Mode::Pomo,
                next: Mode::ShortBreak,
                ..
            }
        )));
        assert_eq!(sink.texts, vec!["🥤 05:00", ""]);
        assert_eq!(timer.mode(), Mode::NoTimer);
        assert_eq!(timer.cycle_count(), 1);
    }

    fn logging_timer() -> (Timer<MemoryStore, ManualClock>, ManualClock, MemoryStore) {
        let mut config = Config::default();
        config.logging.enabled = true;
        config.logging.file = "Pomodoros.md".into();
        let clock = ManualClock::default();
        let store = MemoryStore::new();
        let timer = Timer::new(config, store.clone(), clock.clone());
        (timer, clock, store)
    }

    #[tokio::test]
    async fn pause_after_expiry_completes_interval_first() {
        let (mut timer, clock, store) = logging_timer();
        timer.start_timer(Mode::Pomo);
        clock.advance(chrono::Duration::minutes(26));

        let (tx, rx) = mpsc::channel(4);
        tx.send(Input::Command(Command::TogglePause)).await.unwrap();
        tx.send(Input::Tick).await.unwrap();
        drop(tx);

        let mut sink = Recorder::default();
        let timer = run(timer, rx, &mut sink).await;

        assert!(matches!(sink.events[0], Event::EntryLogged { .. }));
        assert!(matches!(
            sink.events[1],
            Event::IntervalCompleted {
                mode: Mode::Pomo,
                next: Mode::ShortBreak,
                ..
            }
        ));
        assert!(matches!(
            sink.events[2],
            Event::TimerPaused {
                mode: Mode::ShortBreak,
                ..
            }
        ));
        assert_eq!(sink.texts, vec!["🥤 05:00 ⏸", ""]);
        assert_eq!(timer.cycle_count(), 1);
        let log = store.get("Pomodoros.md").unwrap();
        assert_eq!(log.lines().count(), 1);
        assert!(log.starts_with("[🍅] "));
    }

    #[tokio::test]
    async fn quit_after_expiry_keeps_finished_pomodoro() {
        for command in [Command::Quit, Command::StartPomo, Command::RibbonClick] {
            let (mut timer, clock, store) = logging_timer();
            timer.start_timer(Mode::Pomo);
            clock.advance(chrono::Duration::minutes(26));

            let (tx, rx) = mpsc::channel(4);
            tx.send(Input::Command(command.clone())).await.unwrap();
            drop(tx);

            let mut sink = Recorder::default();
            let timer = run(timer, rx, &mut sink).await;

            assert_eq!(timer.cycle_count(), 1, "{command:?}");
            assert!(store.get("Pomodoros.md").is_some(), "{command:?}");
            assert!(sink
                .events
                .iter()
                .any(|e| matches!(e, Event::IntervalCompleted { mode: Mode::Pomo, .. })));
        }
    }

    #[tokio::test]
    async fn shutdown_after_expiry_logs_before_quitting() {
        let (mut timer, clock, store) = logging_timer();
        timer.start_timer(Mode::Pomo);
        clock.advance(chrono::Duration::minutes(30));

        let (tx, rx) = mpsc::channel(4);
        tx.send(Input::Shutdown).await.unwrap();

        let mut sink = Recorder::default();
        let timer = run(timer, rx, &mut sink).await;

        assert_eq!(timer.cycle_count(), 1);
        assert_eq!(timer.mode(), Mode::NoTimer);
        assert!(store.get("Pomodoros.md").is_some());
    }

    #[tokio::test]
    async fn informational_commands_reply_through_sink() {
        let (timer, _clock) = new_timer();
        let (tx, rx) = mpsc::channel(4);
        tx.send(Input::Command(Command::OpenLog)).await.unwrap();
        tx.send(Input::Command(Command::ShowChecklist)).await.unwrap();
        drop(tx);

        let mut sink = Recorder::default();
        run(timer, rx, &mut sink).await;
        assert_eq!(sink.messages, vec!["logging is disabled", "no checklist"]);
    }
}
