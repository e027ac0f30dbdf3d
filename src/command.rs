//! Command slots filled in by the render layer.
//!
//! The render layer owns the scene and knows how to export it or capture a
//! frame. After mounting it registers those actions here; the UI invokes
//! them on user request. The configurator itself never calls them.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// A zero-argument action supplied by the render layer.
pub type Command = Arc<dyn Fn() + Send + Sync>;

/// Holds the latest registration of a [`Command`].
#[derive(Clone, Default)]
pub struct CommandSlot {
    command: Option<Command>,
}

impl fmt::Debug for CommandSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSlot")
            .field("registered", &self.is_registered())
            .finish()
    }
}

impl CommandSlot {
    /// Replaces any previous registration.
    pub fn register<F>(&mut self, command: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.command = Some(Arc::new(command));
    }

    pub fn get(&self) -> Option<Command> {
        self.command.clone()
    }

    pub fn is_registered(&self) -> bool {
        self.command.is_some()
    }

    /// Runs the registered command. Returns false if none is registered.
    pub fn trigger(&self) -> bool {
        match &self.command {
            Some(command) => {
                command();
                true
            }
            None => false,
        }
    }
}

/// File name for an exported avatar model.
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("avatar_{}.glb", now.timestamp_millis())
}
