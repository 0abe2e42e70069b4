//! Job lifecycle for one domain: create, schedule, run, repeat or retire, cancel

use super::delay_scheduler::DelayScheduler;
use super::job_registry::JobRegistry;
use super::types::{Domain, Job, ScheduleHandle, UPDATE_PRIORITY};
use crate::errors::{SourceError, SourceResult};
use crate::utils::time::{parse_update_time, seconds_until};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Local};
use tracing::{error, info, warn};

/// The refresh a domain performs when one of its jobs fires
#[async_trait]
pub trait UpdateAction: Send {
    async fn run(&mut self) -> SourceResult<()>;
}

/// A fired job whose refresh failed
#[derive(Debug)]
pub struct UpdateFailure {
    pub domain: Domain,
    pub name: String,
    pub error: SourceError,
}

/// Owns one domain's job registry and delay scheduler
#[derive(Debug)]
pub struct UpdateController {
    domain: Domain,
    registry: JobRegistry,
    scheduler: DelayScheduler<String>,
    repeat_interval: Duration,
}

impl UpdateController {
    /// `repeat_interval` is the fixed delay used to re-arm repeating jobs
    pub fn new(domain: Domain, repeat_interval: Duration) -> Self {
        Self {
            domain,
            registry: JobRegistry::new(),
            scheduler: DelayScheduler::new(),
            repeat_interval,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &DelayScheduler<String> {
        &self.scheduler
    }

    pub fn repeat_interval(&self) -> Duration {
        self.repeat_interval
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Create a job for the next occurrence of `update_time` ("HH:MM").
    ///
    /// Returns `None`, after logging, when the time cannot be parsed.
    pub fn create_update(
        &mut self,
        update_time: &str,
        name: &str,
        repeats: bool,
        now: DateTime<Local>,
    ) -> Option<ScheduleHandle> {
        let target = match parse_update_time(update_time) {
            Ok(target) => target,
            Err(e) => {
                warn!("{} update '{}' not created: {}", self.domain, name, e);
                return None;
            }
        };

        let mut job = Job::new(name, update_time, repeats);
        // keep the old handle so scheduling cancels its callback
        job.handle = self.registry.get(name).and_then(|existing| existing.handle);
        self.registry.insert(job);

        let delay = Duration::seconds(seconds_until(target, now.time()));
        let handle = self.schedule_update(delay, name, now)?;

        let repeating = if repeats { "Repeating" } else { "Single" };
        info!(
            "{} {} update '{}' created for {}.",
            repeating, self.domain, name, update_time
        );
        Some(handle)
    }

    /// Arm the job called `name` to run after `delay`.
    ///
    /// An unknown name gets a placeholder job. Any callback still pending for
    /// the name is cancelled so exactly one stays live. A delay past the
    /// representable date range leaves no callback, so the job is dropped
    /// and `None` returned.
    pub fn schedule_update(
        &mut self,
        delay: Duration,
        name: &str,
        now: DateTime<Local>,
    ) -> Option<ScheduleHandle> {
        if !self.registry.contains(name) {
            self.registry.insert(Job::placeholder(name));
            warn!("Update '{}' not found, dummy update created.", name);
        }

        let scheduled = self
            .scheduler
            .schedule(now, delay, UPDATE_PRIORITY, name.to_string());

        let previous = match scheduled {
            Some(handle) => self
                .registry
                .get_mut(name)
                .and_then(|job| job.handle.replace(handle)),
            None => {
                warn!("{} update '{}' could not be scheduled, removed.", self.domain, name);
                self.registry.remove(name).and_then(|job| job.handle)
            }
        };
        if let Some(previous) = previous {
            if self.scheduler.is_pending(previous) {
                self.scheduler.cancel(previous);
            }
        }
        scheduled
    }

    /// Run every job due at `now`, in fire-time order.
    ///
    /// Jobs re-armed while sweeping are picked up by the next sweep.
    pub async fn run_pending<A>(&mut self, action: &mut A, now: DateTime<Local>) -> Vec<UpdateFailure>
    where
        A: UpdateAction + ?Sized,
    {
        let mut failures = Vec::new();
        for fired in self.scheduler.drain_due(now) {
            let result = self.run_update(&fired.payload, action, now).await;
            if let Err(error) = result {
                failures.push(UpdateFailure {
                    domain: self.domain,
                    name: fired.payload,
                    error,
                });
            }
        }
        failures
    }

    /// Perform the refresh for `name`, then repeat or retire the job.
    ///
    /// The job is re-armed or removed even when the refresh fails, so a
    /// failing repeating job keeps retrying on its interval.
    pub async fn run_update<A>(
        &mut self,
        name: &str,
        action: &mut A,
        now: DateTime<Local>,
    ) -> SourceResult<()>
    where
        A: UpdateAction + ?Sized,
    {
        let result = action.run().await;
        match &result {
            Ok(()) => info!("{} update '{}' completed.", self.domain, name),
            Err(e) => error!("{} update '{}' failed: {}", self.domain, name, e),
        }

        match self.registry.get(name).map(|job| job.repeats) {
            Some(true) => {
                if self.schedule_update(self.repeat_interval, name, now).is_some() {
                    info!("{} update '{}' scheduled to repeat.", self.domain, name);
                }
            }
            Some(false) => {
                self.registry.remove(name);
                info!("{} update '{}' removed.", self.domain, name);
            }
            None => warn!("{} update '{}' does not exist.", self.domain, name),
        }

        result
    }

    /// Cancel and forget the job called `name`. Returns false if absent.
    pub fn cancel(&mut self, name: &str) -> bool {
        match self.registry.remove(name) {
            Some(job) => {
                if let Some(handle) = job.handle {
                    self.scheduler.cancel(handle);
                }
                info!("{} update '{}' removed.", self.domain, name);
                true
            }
            None => false,
        }
    }
}
