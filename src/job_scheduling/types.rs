//! Job scheduling type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Text shown as the time of a job synthesized for an unknown name
pub const PLACEHOLDER_TIME: &str = "None";

/// Priority given to every update callback
pub const UPDATE_PRIORITY: u32 = 1;

/// The data set a job refreshes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Covid,
    News,
}

impl Domain {
    /// Label used in log lines
    pub fn label(&self) -> &'static str {
        match self {
            Domain::Covid => "COVID",
            Domain::News => "News",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Opaque reference to a pending scheduled callback, valid until it fires
/// or is cancelled. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScheduleHandle(pub(crate) u64);

impl fmt::Display for ScheduleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named pending update in one domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub name: String,
    /// Time of day as entered by the user; kept as-is across repeats
    pub time: String,
    pub repeats: bool,
    /// Callback that will run this job next
    #[serde(skip)]
    pub handle: Option<ScheduleHandle>,
}

impl Job {
    pub fn new(name: impl Into<String>, time: impl Into<String>, repeats: bool) -> Self {
        Self {
            name: name.into(),
            time: time.into(),
            repeats,
            handle: None,
        }
    }

    /// Stand-in for a job that was scheduled without being created first
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self::new(name, PLACEHOLDER_TIME, false)
    }
}
