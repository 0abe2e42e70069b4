//! Update scheduling subsystem
//!
//! Each data domain (covid, news) owns an `UpdateController`, which pairs a
//! `JobRegistry` of named jobs with a `DelayScheduler` of pending callbacks.
//! The reconciler merges both registries into one list for display.
//!
//! Nothing here spawns tasks or sleeps: the owner sweeps the controllers with
//! `run_pending` on each tick.

pub mod delay_scheduler;
pub mod job_registry;
pub mod reconciler;
pub mod types;
pub mod update_controller;

pub use delay_scheduler::{DelayScheduler, FiredCallback};
pub use job_registry::JobRegistry;
pub use reconciler::{build_display_list, format_update, DisplayUpdate};
pub use types::*;
pub use update_controller::{UpdateAction, UpdateController, UpdateFailure};
