//! RRG View
//!
//! Stateful view over a fetched RRG dataset: load lifecycle, date scrubbing,
//! tail length and visibility, with last-request-wins reloads.

pub mod config;
pub mod controller;
pub mod state;

#[cfg(test)]
mod tests;

pub use config::ViewConfig;
pub use controller::RotationController;
pub use state::{EmptyReason, ReloadOutcome, ReloadTicket, RotationView, ViewState};
