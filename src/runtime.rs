use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::picker::Photo;

/// Interval between redraw frames when nothing else happens
pub const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Interval between countdown ticks
pub const COUNTDOWN_INTERVAL: Duration = Duration::from_secs(1);

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    Resize,
    /// Redraw frame, produced when no other event arrives in time
    Tick,
    /// One second of game time elapsed for the given countdown generation
    Countdown(u64),
    /// A photo load started during the given countdown generation finished;
    /// `None` when unreadable
    Picked(u64, Option<Photo>),
}

/// Source of game events (keyboard, resize, timers, picker completions)
pub trait GameEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<GameEvent>,
    rx: Receiver<GameEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        let key_tx = tx.clone();
        thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if key_tx.send(GameEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if key_tx.send(GameEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { tx, rx }
    }

    /// Handle for timers and workers that post back onto this source
    pub fn sender(&self) -> Sender<GameEvent> {
        self.tx.clone()
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl GameEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<GameEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<GameEvent>) -> Self {
        Self { rx }
    }
}

impl GameEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: GameEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: GameEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> GameEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => GameEvent::Tick,
        }
    }
}

/// The once-per-second timer driving a game.
///
/// Every `start` opens a new generation; ticks from an older generation
/// must be ignored by whoever receives them.
pub trait Countdown {
    /// Starts ticking (restarting if already running) and returns the new generation.
    fn start(&mut self) -> u64;
    fn stop(&mut self);
    fn is_running(&self) -> bool;
    fn generation(&self) -> u64;
}

/// Countdown whose ticks are delivered by the caller, for tests and headless runs
#[derive(Debug, Default, Clone)]
pub struct ManualCountdown {
    generation: u64,
    running: bool,
}

impl ManualCountdown {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Countdown for ManualCountdown {
    fn start(&mut self) -> u64 {
        self.generation += 1;
        self.running = true;
        self.generation
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}

/// Countdown backed by a timer thread posting [`GameEvent::Countdown`]
#[derive(Debug)]
pub struct ChannelCountdown {
    tx: Sender<GameEvent>,
    interval: Duration,
    generation: u64,
    cancel: Option<Arc<AtomicBool>>,
}

impl ChannelCountdown {
    pub fn new(tx: Sender<GameEvent>) -> Self {
        Self::with_interval(tx, COUNTDOWN_INTERVAL)
    }

    pub fn with_interval(tx: Sender<GameEvent>, interval: Duration) -> Self {
        Self {
            tx,
            interval,
            generation: 0,
            cancel: None,
        }
    }
}

impl Countdown for ChannelCountdown {
    fn start(&mut self) -> u64 {
        self.stop();
        self.generation += 1;

        let cancel = Arc::new(AtomicBool::new(false));
        let stopped = Arc::clone(&cancel);
        let tx = self.tx.clone();
        let interval = self.interval;
        let generation = self.generation;

        thread::spawn(move || loop {
            thread::sleep(interval);
            if stopped.load(Ordering::SeqCst) {
                break;
            }
            if tx.send(GameEvent::Countdown(generation)).is_err() {
                break;
            }
        });

        self.cancel = Some(cancel);
        log::debug!("countdown generation {generation} started");
        generation
    }

    fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.store(true, Ordering::SeqCst);
            log::debug!("countdown generation {} stopped", self.generation);
        }
    }

    fn is_running(&self) -> bool {
        self.cancel.is_some()
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for ChannelCountdown {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        // With no events available, step should yield Tick
        let ev = runner.step();
        match ev {
            GameEvent::Tick => {}
            _ => panic!("expected Tick on timeout"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(GameEvent::Resize).unwrap();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let runner = Runner::new(es, ticker);

        match runner.step() {
            GameEvent::Resize => {}
            _ => panic!("expected Resize event"),
        }
    }

    #[test]
    fn manual_countdown_generations() {
        let mut countdown = ManualCountdown::new();
        assert!(!countdown.is_running());
        assert_eq!(countdown.start(), 1);
        assert!(countdown.is_running());
        countdown.stop();
        assert!(!countdown.is_running());
        assert_eq!(countdown.start(), 2);
        assert_eq!(countdown.generation(), 2);
    }

    #[test]
    fn channel_countdown_posts_tagged_ticks() {
        let (tx, rx) = mpsc::channel();
        let mut countdown = ChannelCountdown::with_interval(tx, Duration::from_millis(5));

        let generation = countdown.start();
        match rx.recv_timeout(Duration::from_secs(2)) {
            Ok(GameEvent::Countdown(g)) => assert_eq!(g, generation),
            other => panic!("expected a countdown tick, got {other:?}"),
        }
        countdown.stop();
        assert!(!countdown.is_running());
    }

    #[test]
    fn channel_countdown_restart_bumps_generation() {
        let (tx, rx) = mpsc::channel();
        let mut countdown = ChannelCountdown::with_interval(tx, Duration::from_millis(5));

        let first = countdown.start();
        let second = countdown.start();
        assert_eq!(second, first + 1);

        // the first timer may still deliver one in-flight tick; every later
        // tick belongs to the new generation
        let mut saw_second = false;
        for _ in 0..20 {
            if let Ok(GameEvent::Countdown(g)) = rx.recv_timeout(Duration::from_secs(1)) {
                if g == second {
                    saw_second = true;
                    break;
                }
            }
        }
        assert!(saw_second);
    }

    #[test]
    fn stopped_channel_countdown_goes_quiet() {
        let (tx, rx) = mpsc::channel();
        let mut countdown = ChannelCountdown::with_interval(tx, Duration::from_millis(5));

        countdown.start();
        countdown.stop();
        // drain anything sent before the flag was observed
        std::thread::sleep(Duration::from_millis(30));
        while rx.try_recv().is_ok() {}

        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }
}
