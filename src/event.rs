use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, KeyEvent, KeyEventKind};
use log::warn;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Terminal input arrives from a reader thread; ticks are produced here
/// when the caller's deadline passes, so there is never more than one
/// pending tick.
pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(poll_ms: u64) -> Self {
        let (tx, rx) = mpsc::channel();
        let poll_rate = Duration::from_millis(poll_ms);

        thread::spawn(move || loop {
            match event::poll(poll_rate) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(err) => {
                    warn!("input polling failed: {}", err);
                    return;
                }
            }
            let forwarded = match event::read() {
                Ok(crossterm::event::Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    tx.send(Event::Key(key))
                }
                Ok(crossterm::event::Event::Resize(..)) => tx.send(Event::Resize),
                Ok(_) => Ok(()),
                Err(err) => {
                    warn!("input read failed: {}", err);
                    return;
                }
            };
            if forwarded.is_err() {
                return;
            }
        });

        Self::from_receiver(rx)
    }

    /// Handler over an existing input channel.
    pub fn from_receiver(rx: mpsc::Receiver<Event>) -> Self {
        Self { rx }
    }

    /// Next input event, or `Tick` once `deadline` has passed. Without a
    /// deadline this blocks until input arrives.
    pub fn next(&self, deadline: Option<Instant>) -> io::Result<Event> {
        let Some(deadline) = deadline else {
            return self.rx.recv().map_err(|_| input_closed());
        };
        let now = Instant::now();
        if deadline <= now {
            // overrun frames must not starve input
            return Ok(self.rx.try_recv().unwrap_or(Event::Tick));
        }
        match self.rx.recv_timeout(deadline - now) {
            Ok(event) => Ok(event),
            Err(RecvTimeoutError::Timeout) => Ok(Event::Tick),
            Err(RecvTimeoutError::Disconnected) => Err(input_closed()),
        }
    }
}

fn input_closed() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "input thread stopped")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn overdue_deadline_still_delivers_queued_input_first() {
        let (tx, rx) = mpsc::channel();
        let events = EventHandler::from_receiver(rx);
        tx.send(key(' ')).unwrap();
        let overdue = Instant::now();

        assert!(matches!(events.next(Some(overdue)).unwrap(), Event::Key(_)));
        assert!(matches!(events.next(Some(overdue)).unwrap(), Event::Tick));
    }

    #[test]
    fn pending_deadline_times_out_into_a_tick() {
        let (_tx, rx) = mpsc::channel();
        let events = EventHandler::from_receiver(rx);
        let deadline = Instant::now() + Duration::from_millis(5);
        assert!(matches!(events.next(Some(deadline)).unwrap(), Event::Tick));
        assert!(Instant::now() >= deadline);
    }

    #[test]
    fn input_before_the_deadline_wins() {
        let (tx, rx) = mpsc::channel();
        let events = EventHandler::from_receiver(rx);
        tx.send(Event::Resize).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        assert!(matches!(events.next(Some(deadline)).unwrap(), Event::Resize));
    }

    #[test]
    fn closed_input_is_an_error_without_a_deadline() {
        let (tx, rx) = mpsc::channel::<Event>();
        drop(tx);
        let events = EventHandler::from_receiver(rx);
        assert!(events.next(None).is_err());
    }
}
