//! Poll loop: snapshot pair -> engine -> sink, once per interval.

use anyhow::Result;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::engine::{ScanEngine, ScanEvent};
use crate::notify::NotificationSink;
use crate::snapshot::{SnapshotSource, FINAL_EXT, PENDING_EXT};

pub struct Monitor<S, N> {
    source: S,
    sink: N,
    engine: ScanEngine,
    poll_interval: Duration,
    stop: Arc<AtomicBool>,
}

impl<S: SnapshotSource, N: NotificationSink> Monitor<S, N> {
    pub fn new(
        source: S,
        sink: N,
        engine: ScanEngine,
        poll_interval: Duration,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            source,
            sink,
            engine,
            poll_interval,
            stop,
        }
    }

    /// Run until the stop flag is set. The flag is checked once per
    /// iteration; a tick always executes start to finish.
    pub fn run(&mut self) {
        while !self.stop.load(Ordering::SeqCst) {
            self.tick();
            thread::sleep(self.poll_interval);
        }
    }

    /// One poll cycle. A failing snapshot or sink never escapes: it is
    /// surfaced as an "Error" alert and the next interval retries.
    pub fn tick(&mut self) {
        if let Err(e) = self.try_tick() {
            let event = ScanEvent::TickError {
                message: format!("{:#}", e),
            };
            self.sink.notify(event.title(), &event.message());
        }
    }

    fn try_tick(&mut self) -> Result<()> {
        let pending = self.source.base_names(PENDING_EXT)?;
        let finals = self.source.base_names(FINAL_EXT)?;

        let events = self.engine.tick(&pending, &finals, Utc::now());
        for event in &events {
            self.sink.notify(event.title(), &event.message());
        }

        Ok(())
    }
}
