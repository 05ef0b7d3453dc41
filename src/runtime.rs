use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};
use log::debug;

/// What wakes the race loop up.
#[derive(Clone, Debug)]
pub enum InputEvent {
    Key(KeyEvent),
    Resize,
    /// The wait ran out, either on the tick rate or on the race deadline.
    Tick(Instant),
}

pub trait InputEventSource: Send + 'static {
    /// Waits up to `timeout` for the next terminal event.
    fn recv_timeout(&self, timeout: Duration) -> Result<InputEvent, RecvTimeoutError>;
}

/// Reads crossterm events on a background thread.
pub struct CrosstermEventSource {
    rx: Receiver<InputEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        Self {
            rx: spawn_reader(event::read),
        }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

fn spawn_reader<F>(mut read: F) -> Receiver<InputEvent>
where
    F: FnMut() -> std::io::Result<CtEvent> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || loop {
        let evt = match read() {
            Ok(CtEvent::Key(key)) => InputEvent::Key(key),
            Ok(CtEvent::Resize(_, _)) => InputEvent::Resize,
            Ok(_) => continue,
            Err(e) => {
                debug!("terminal event reader stopped: {e}");
                break;
            }
        };

        if tx.send(evt).is_err() {
            break;
        }
    });

    rx
}

impl InputEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<InputEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Event source fed through a channel, for driving the loop without a terminal.
pub struct ChannelEventSource {
    rx: Receiver<InputEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<InputEvent>) -> Self {
        Self { rx }
    }
}

impl InputEventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<InputEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Paces the race loop. Wakes up at least once per tick and exactly at the race
/// deadline, so a race runs out of time on the limit rather than on the next tick.
pub struct Runner<E: InputEventSource> {
    event_source: E,
    tick_rate: Duration,
}

impl<E: InputEventSource> Runner<E> {
    pub fn new(event_source: E, tick_rate: Duration) -> Self {
        Self {
            event_source,
            tick_rate,
        }
    }

    /// How long to wait for input at `now` before ticking.
    pub fn wait_for(&self, deadline: Option<Instant>, now: Instant) -> Duration {
        match deadline {
            Some(deadline) => self.tick_rate.min(deadline.saturating_duration_since(now)),
            None => self.tick_rate,
        }
    }

    /// Returns the next event, or a `Tick` once the wait runs out.
    pub fn step(&self, deadline: Option<Instant>) -> InputEvent {
        let timeout = self.wait_for(deadline, Instant::now());

        match self.event_source.recv_timeout(timeout) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => InputEvent::Tick(Instant::now()),
            Err(RecvTimeoutError::Disconnected) => {
                // no more input, keep the timer going
                thread::sleep(timeout);
                InputEvent::Tick(Instant::now())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::io;

    fn runner(tick_ms: u64) -> (mpsc::Sender<InputEvent>, Runner<ChannelEventSource>) {
        let (tx, rx) = mpsc::channel();
        let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(tick_ms));
        (tx, runner)
    }

    #[test]
    fn wait_is_tick_rate_without_deadline() {
        let (_tx, runner) = runner(100);
        assert_eq!(runner.wait_for(None, Instant::now()), Duration::from_millis(100));
    }

    #[test]
    fn wait_stops_at_deadline() {
        let (_tx, runner) = runner(100);
        let now = Instant::now();

        assert_eq!(
            runner.wait_for(Some(now + Duration::from_millis(30)), now),
            Duration::from_millis(30)
        );
        assert_eq!(
            runner.wait_for(Some(now + Duration::from_secs(5)), now),
            Duration::from_millis(100)
        );
        assert_eq!(runner.wait_for(Some(now), now), Duration::ZERO);
    }

    #[test]
    fn step_ticks_at_passed_deadline_without_waiting() {
        let (_tx, runner) = runner(10_000);
        let before = Instant::now();

        match runner.step(Some(before)) {
            InputEvent::Tick(at) => {
                assert!(at >= before);
                assert!(at - before < Duration::from_secs(1));
            }
            other => panic!("expected Tick, got {other:?}"),
        }
    }

    #[test]
    fn step_ticks_when_source_is_gone() {
        let (tx, runner) = runner(5);
        drop(tx);
        let before = Instant::now();

        assert!(matches!(runner.step(None), InputEvent::Tick(_)));
        assert!(before.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, runner) = runner(10);
        tx.send(InputEvent::Key(KeyEvent::new(
            KeyCode::Char('a'),
            KeyModifiers::NONE,
        )))
        .unwrap();

        match runner.step(None) {
            InputEvent::Key(key) => assert_eq!(key.code, KeyCode::Char('a')),
            other => panic!("expected Key event, got {other:?}"),
        }
    }

    #[test]
    fn reader_forwards_keys_and_resizes_until_error() {
        let mut events = vec![
            Ok(CtEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))),
            Ok(CtEvent::FocusGained),
            Ok(CtEvent::Resize(80, 24)),
            Err(io::Error::other("closed")),
        ]
        .into_iter();
        let rx = spawn_reader(move || events.next().unwrap_or_else(|| Err(io::Error::other("done"))));

        assert!(matches!(rx.recv().unwrap(), InputEvent::Key(k) if k.code == KeyCode::Enter));
        assert!(matches!(rx.recv().unwrap(), InputEvent::Resize));
        assert!(rx.recv().is_err());
    }
}
