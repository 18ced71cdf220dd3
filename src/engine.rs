//! Scan state engine.
//!
//! Turns two periodic directory snapshots (pending `.tmp` names, finalized
//! `.svs` names) into scan lifecycle events by diffing against tracked state
//! between polls. Pure function of (state, snapshot pair, now); all I/O and
//! sleeping lives in the surrounding monitor loop.

use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Typed alert emitted by `ScanEngine::tick()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// No pending files and no batch in progress (heartbeat, every idle tick).
    Idle,
    /// First pending file of a new batch appeared.
    ScanStarted,
    /// A slide's pending file was seen for the first time.
    SlideScanning { name: String },
    /// A pending file outlived the stall threshold and was dropped from tracking.
    ScanStalled { name: String, minutes: i64 },
    /// An active slide showed up in the finalized snapshot.
    SlideSaved { name: String },
    /// No pending files for longer than the batch timeout while a batch was open.
    BatchComplete,
    /// A poll-loop failure surfaced as an alert (never produced by the engine).
    TickError { message: String },
}

impl ScanEvent {
    pub fn title(&self) -> &'static str {
        match self {
            ScanEvent::Idle => "Device status - Idle",
            ScanEvent::ScanStarted => "Scan Started",
            ScanEvent::SlideScanning { .. } => "Slide Scanning",
            ScanEvent::ScanStalled { .. } => "Scan Error",
            ScanEvent::SlideSaved { .. } => "Slide WSI Saved",
            ScanEvent::BatchComplete => "Batch Scan Complete",
            ScanEvent::TickError { .. } => "Error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ScanEvent::Idle => "No slides are being scanned.".to_string(),
            ScanEvent::ScanStarted => "WSI scanning has started.".to_string(),
            ScanEvent::SlideScanning { name } => {
                format!("Scanning started for slide: {}.tmp", name)
            }
            ScanEvent::ScanStalled { name, minutes } => format!(
                "Slide '{}' .tmp file exists for over {} minutes. Possible stall",
                name, minutes
            ),
            ScanEvent::SlideSaved { name } => format!("Slide Saved: {}.svs", name),
            ScanEvent::BatchComplete => {
                "All files scanned and device in idle state.".to_string()
            }
            ScanEvent::TickError { message } => format!("An error occurred: {}", message),
        }
    }
}

/// All mutable tracking state plus the two debounce thresholds.
///
/// Ordered collections keep per-tick event order deterministic: within a
/// step, names are processed in lexicographic order.
pub struct ScanEngine {
    max_pending_age: Duration,
    no_pending_timeout: Duration,
    /// Pending base name -> when it was first observed pending.
    pending: BTreeMap<String, DateTime<Utc>>,
    /// Slides believed mid-acquisition. Disjoint from `completed`.
    active: BTreeSet<String>,
    /// Slides confirmed finalized within the current batch.
    completed: BTreeSet<String>,
    in_progress: bool,
    /// Last tick at which the pending snapshot was non-empty.
    last_pending_seen: Option<DateTime<Utc>>,
}

impl ScanEngine {
    pub fn new(max_pending_age: Duration, no_pending_timeout: Duration) -> Self {
        Self {
            max_pending_age,
            no_pending_timeout,
            pending: BTreeMap::new(),
            active: BTreeSet::new(),
            completed: BTreeSet::new(),
            in_progress: false,
            last_pending_seen: None,
        }
    }

    /// Consume one snapshot pair and return the alerts it triggered, in order.
    ///
    /// Steps run in a fixed order every tick: idle heartbeat, scan-started,
    /// new pending files, stale removal, stall detection, finalization,
    /// last-seen update, batch-complete. A file first seen this tick can
    /// never stall this tick (its age is zero), and stall candidates are
    /// only files still present after stale removal.
    pub fn tick(
        &mut self,
        pending: &BTreeSet<String>,
        finals: &BTreeSet<String>,
        now: DateTime<Utc>,
    ) -> Vec<ScanEvent> {
        let mut events = Vec::new();

        if pending.is_empty() && !self.in_progress {
            events.push(ScanEvent::Idle);
        }

        if !self.in_progress && !pending.is_empty() {
            self.in_progress = true;
            events.push(ScanEvent::ScanStarted);
        }

        for name in pending {
            if !self.pending.contains_key(name) {
                self.pending.insert(name.clone(), now);
                events.push(ScanEvent::SlideScanning { name: name.clone() });
                if !self.active.contains(name) && !self.completed.contains(name) {
                    self.active.insert(name.clone());
                }
            }
        }

        // A vanished pending file is dropped silently; the engine cannot tell
        // finalization apart from external deletion (the final snapshot is
        // what confirms a save, in step 6).
        self.pending.retain(|name, _| pending.contains(name));

        let stalled: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, first_seen)| now - **first_seen > self.max_pending_age)
            .map(|(name, _)| name.clone())
            .collect();
        for name in stalled {
            self.pending.remove(&name);
            events.push(ScanEvent::ScanStalled {
                name,
                minutes: self.max_pending_age.num_minutes(),
            });
        }

        let finalized: Vec<String> = self
            .active
            .iter()
            .filter(|name| finals.contains(*name))
            .cloned()
            .collect();
        for name in finalized {
            self.active.remove(&name);
            events.push(ScanEvent::SlideSaved { name: name.clone() });
            self.completed.insert(name);
        }

        if !pending.is_empty() {
            self.last_pending_seen = Some(now);
        }

        if self.in_progress {
            if let Some(last_seen) = self.last_pending_seen {
                if now - last_seen > self.no_pending_timeout {
                    events.push(ScanEvent::BatchComplete);
                    self.in_progress = false;
                    self.last_pending_seen = None;
                    self.pending.clear();
                    self.active.clear();
                    self.completed.clear();
                }
            }
        }

        events
    }
}
