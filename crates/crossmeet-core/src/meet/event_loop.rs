//! Event loop for a live meet
//!
//! Drains decoder events and ticks recalculation at the configured interval.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::decoder::DecoderEvent;
use crate::state::RaceSnapshot;

use super::Meet;

impl Meet {
    /// Run the meet loop
    ///
    /// The `shutdown_requested` flag is checked each iteration to allow graceful shutdown via Ctrl+C.
    /// The loop also ends when every event sender has hung up. Pending changes are
    /// settled before returning.
    pub fn run(&self, events: &Receiver<DecoderEvent>, shutdown_requested: &AtomicBool) -> RaceSnapshot {
        let interval = Duration::from_millis(self.config.tick_interval_ms.max(1));
        let mut next_tick = Instant::now() + interval;

        debug!("Starting meet loop...");

        loop {
            if shutdown_requested.load(Ordering::SeqCst) {
                debug!("Shutdown signal received, exiting meet loop");
                break;
            }

            let timeout = next_tick.saturating_duration_since(Instant::now());
            match events.recv_timeout(timeout) {
                Ok(event) => self.handle_event(event),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("Decoder disconnected, exiting meet loop");
                    break;
                }
            }

            if Instant::now() >= next_tick {
                self.tick();
                next_tick = Instant::now() + interval;
            }
        }

        self.tick();
        self.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{meet, tod};
    use super::*;
    use std::sync::mpsc;
    use std::thread;

    #[test]
    fn test_run_until_disconnect() {
        let meet = meet(&["1", "2"]);
        meet.arm_start().unwrap();

        let (tx, rx) = mpsc::channel();
        tx.send(DecoderEvent::StartTrigger { time: tod(0, 0) }).unwrap();
        for (bib, s) in [("2", 0), ("1", 2)] {
            tx.send(DecoderEvent::Passing {
                bib: bib.into(),
                time: tod(8, s),
                channel: None,
            })
            .unwrap();
        }
        tx.send(DecoderEvent::Status("loop ok".into())).unwrap();
        drop(tx);

        let snapshot = meet.run(&rx, &AtomicBool::new(false));
        assert_eq!(snapshot.riders[0].bib, "2");
        assert_eq!(snapshot.rider("1").unwrap().laps, 1);
        assert_eq!(
            snapshot.rider("1").unwrap().bunch,
            snapshot.rider("2").unwrap().bunch
        );
        assert!(!meet.is_dirty());
    }

    #[test]
    fn test_run_stops_on_shutdown() {
        let meet = meet(&["1"]);
        let (tx, rx) = mpsc::channel::<DecoderEvent>();
        let shutdown = AtomicBool::new(false);

        thread::scope(|s| {
            s.spawn(|| {
                thread::sleep(Duration::from_millis(50));
                shutdown.store(true, Ordering::SeqCst);
            });
            meet.run(&rx, &shutdown);
        });
        drop(tx);
        assert!(shutdown.load(Ordering::SeqCst));
    }
}
