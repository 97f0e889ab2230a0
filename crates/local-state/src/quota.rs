//! Daily submission quota
//!
//! A soft, per-installation ceiling on how many proposals can be sent per
//! calendar day. The count lives in a single storage slot together with the day
//! it belongs to; a record from an earlier day reads as zero and is simply
//! overwritten by the next increment.
//!
//! Storage faults never reach the caller. A slot that can't be read or parsed
//! is treated as empty, and a failed write is logged and otherwise ignored.
//! Separate processes sharing one data directory can race on
//! read-modify-write; within one process, increments and the limit check in
//! [`QuotaTracker::try_reserve`] are serialized.

use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::events::EventBus;
use crate::store::{KeyValueStore, SlotRead};
use crate::types::{LocalEvent, QuotaLoad, QuotaState};

pub const QUOTA_KEY: &str = "mb_submit_quota_v1";
pub const DEFAULT_DAILY_LIMIT: u32 = 5;

pub struct QuotaTracker {
    store: Option<Arc<dyn KeyValueStore>>,
    clock: Arc<dyn Clock>,
    bus: EventBus,
    write_lock: Mutex<()>,
}

impl QuotaTracker {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, bus: EventBus) -> Self {
        Self {
            store: Some(store),
            clock,
            bus,
            write_lock: Mutex::new(()),
        }
    }

    /// A tracker with no storage behind it: nothing is counted and every
    /// submission is allowed
    pub fn detached() -> Self {
        Self {
            store: None,
            clock: Arc::new(SystemClock),
            bus: EventBus::new(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.store.is_some()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LocalEvent> {
        self.bus.subscribe()
    }

    /// Read the stored record and classify it against today
    pub fn load(&self) -> QuotaLoad {
        let Some(store) = &self.store else {
            return QuotaLoad::Unavailable("no local storage".to_string());
        };

        let raw = match store.read(QUOTA_KEY) {
            SlotRead::Present(raw) => raw,
            SlotRead::Absent => return QuotaLoad::Missing,
            SlotRead::Failed(e) => return QuotaLoad::Unavailable(e.to_string()),
        };

        let today = self.clock.today();
        match serde_json::from_str::<QuotaState>(&raw) {
            Ok(state) if state.date == today => QuotaLoad::Current(state),
            Ok(state) => QuotaLoad::Stale(state),
            Err(e) => QuotaLoad::Corrupt(e.to_string()),
        }
    }

    /// Today's effective state after applying the new-day reset
    pub fn state_today(&self) -> QuotaState {
        let today = self.clock.today();
        match self.load() {
            QuotaLoad::Current(state) => state,
            QuotaLoad::Stale(state) => {
                debug!(stored = %state.date, %today, "Quota record is from an earlier day");
                QuotaState::empty(today)
            }
            QuotaLoad::Missing => QuotaState::empty(today),
            QuotaLoad::Corrupt(reason) => {
                warn!(reason = %reason, "Ignoring unreadable quota record");
                QuotaState::empty(today)
            }
            QuotaLoad::Unavailable(reason) => {
                if self.is_attached() {
                    warn!(reason = %reason, "Quota storage read failed");
                }
                QuotaState::empty(today)
            }
        }
    }

    pub fn count_today(&self) -> u32 {
        if !self.is_attached() {
            return 0;
        }
        self.state_today().count
    }

    pub fn can_submit(&self, limit: u32) -> bool {
        if !self.is_attached() {
            return true;
        }
        self.count_today() < limit
    }

    /// Record one submission and return today's new count
    pub fn increment(&self) -> u32 {
        if !self.is_attached() {
            return 0;
        }
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut state = self.state_today();
        state.count = state.count.saturating_add(1);
        state.date = self.clock.today();

        self.persist(&state);
        debug!(date = %state.date, count = state.count, "Incremented submission quota");
        self.bus.publish(LocalEvent::QuotaChanged(state));
        state.count
    }

    /// Check the limit and count one submission in a single step
    ///
    /// Returns today's new count, or `None` when the limit is already reached.
    /// Pair with [`QuotaTracker::release`] if the submission then fails.
    pub fn try_reserve(&self, limit: u32) -> Option<u32> {
        if !self.is_attached() {
            return Some(0);
        }
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut state = self.state_today();
        if state.count >= limit {
            debug!(date = %state.date, count = state.count, limit, "Submission quota exhausted");
            return None;
        }
        state.count += 1;

        self.persist(&state);
        debug!(date = %state.date, count = state.count, "Reserved submission quota");
        self.bus.publish(LocalEvent::QuotaChanged(state));
        Some(state.count)
    }

    /// Give back a reservation whose submission did not go through
    pub fn release(&self) -> u32 {
        if !self.is_attached() {
            return 0;
        }
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut state = self.state_today();
        if state.count == 0 {
            return 0;
        }
        state.count -= 1;

        self.persist(&state);
        debug!(date = %state.date, count = state.count, "Released submission quota");
        self.bus.publish(LocalEvent::QuotaChanged(state));
        state.count
    }

    /// Force today's count back to zero
    pub fn reset(&self) {
        if !self.is_attached() {
            return;
        }
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let state = QuotaState::empty(self.clock.today());
        self.persist(&state);
        self.bus.publish(LocalEvent::QuotaChanged(state));
    }

    fn persist(&self, state: &QuotaState) {
        let Some(store) = &self.store else {
            return;
        };
        let raw = match serde_json::to_string(state) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Failed to encode quota record");
                return;
            }
        };
        if let Err(e) = store.write(QUOTA_KEY, &raw) {
            warn!(error = %e, "Failed to persist quota record");
        }
    }
}
