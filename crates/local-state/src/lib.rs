//! Durable per-installation state
//!
//! Small named slots on disk hold the daily submission quota and the theme
//! preference. Changes to either, plus user-facing toasts, go out on an
//! [`EventBus`] that any number of subscribers can listen to.

mod clock;
mod context;
mod error;
mod events;
mod quota;
mod store;
mod theme;
mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use context::LocalContext;
pub use error::{Result, StorageError};
pub use events::EventBus;
pub use quota::{QuotaTracker, DEFAULT_DAILY_LIMIT, QUOTA_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore, SlotRead};
pub use theme::{ThemeManager, THEME_KEY};
pub use types::{
    LocalEvent, QuotaLoad, QuotaState, Theme, Toast, ToastKind, DEFAULT_TOAST_DURATION,
};
