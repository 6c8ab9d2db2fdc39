mod engine;
mod events;
mod state;

pub use engine::TimerEngine;
pub use events::{TimerEvent, TimerHooks};
pub use state::{TimerSnapshot, TimerState};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("duration must be greater than zero")]
    InvalidDuration,
}

#[cfg(test)]
mod tests;
