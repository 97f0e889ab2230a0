//! Persisted light/dark preference

use std::sync::Arc;
use tracing::warn;

use crate::error::Result;
use crate::events::EventBus;
use crate::store::{KeyValueStore, SlotRead};
use crate::types::{LocalEvent, Theme};

pub const THEME_KEY: &str = "theme";

pub struct ThemeManager {
    store: Arc<dyn KeyValueStore>,
    bus: EventBus,
}

impl ThemeManager {
    pub fn new(store: Arc<dyn KeyValueStore>, bus: EventBus) -> Self {
        Self { store, bus }
    }

    /// The explicitly saved preference, if any
    pub fn saved(&self) -> Option<Theme> {
        match self.store.read(THEME_KEY) {
            SlotRead::Present(value) => Theme::parse(value.trim()),
            SlotRead::Absent => None,
            SlotRead::Failed(e) => {
                warn!(error = %e, "Failed to read theme preference");
                None
            }
        }
    }

    /// Saved preference, else whatever the system asks for
    pub fn current(&self, system_prefers_dark: bool) -> Theme {
        self.saved().unwrap_or(if system_prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        })
    }

    pub fn set(&self, theme: Theme) -> Result<()> {
        self.store.write(THEME_KEY, theme.as_str())?;
        self.bus.publish(LocalEvent::ThemeChanged(theme));
        Ok(())
    }

    pub fn toggle(&self, system_prefers_dark: bool) -> Result<Theme> {
        let next = self.current(system_prefers_dark).toggled();
        self.set(next)?;
        Ok(next)
    }
}
