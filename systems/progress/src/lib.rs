#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure progress system that persists the highest level reached.
//!
//! The stored value is loaded once when the system is created and handed to
//! the world through [`Progress::restore_command`]. Afterwards the system
//! watches for [`Event::HighestLevelRecorded`] and writes through to its store
//! only when the record improves. Storage failures never interrupt play: they
//! are logged and the in-memory value keeps serving queries.

mod store;

use tracing::{info, warn};
use trap_labs_core::{Command, Event, Level};

pub use store::{HighestLevelStore, JsonFileStore, MemoryStore, StoreError, HIGHEST_LEVEL_KEY};

/// Keeps the persisted highest level in sync with the world.
#[derive(Debug)]
pub struct Progress<S> {
    store: S,
    highest: Level,
}

impl<S: HighestLevelStore> Progress<S> {
    /// Creates the system, loading the stored level from `store`.
    pub fn new(mut store: S) -> Self {
        let highest = match store.load() {
            Ok(Some(level)) => level,
            Ok(None) => Level::default(),
            Err(error) => {
                warn!(%error, "could not load progress, starting from zero");
                Level::default()
            }
        };
        info!(%highest, "progress loaded");
        Self { store, highest }
    }

    /// Highest level known to the system.
    #[must_use]
    pub const fn highest(&self) -> Level {
        self.highest
    }

    /// Command seeding the world with the loaded record.
    #[must_use]
    pub const fn restore_command(&self) -> Command {
        Command::RestoreProgress {
            highest_level: self.highest,
        }
    }

    /// Read access to the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Consumes world events and persists improved records.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            let Event::HighestLevelRecorded { level } = event else {
                continue;
            };
            if *level <= self.highest {
                continue;
            }
            self.highest = *level;
            match self.store.save(*level) {
                Ok(()) => info!(level = %self.highest, "highest level saved"),
                Err(error) => warn!(%error, "could not save progress"),
            }
        }
    }
}
