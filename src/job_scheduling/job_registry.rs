//! Named pending jobs for one domain, kept in creation order

use super::types::Job;
use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: IndexMap<String, Job>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the job stored under `job.name`
    pub fn insert(&mut self, job: Job) -> Option<Job> {
        self.jobs.insert(job.name.clone(), job)
    }

    pub fn get(&self, name: &str) -> Option<&Job> {
        self.jobs.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Job> {
        self.jobs.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.jobs.contains_key(name)
    }

    /// Remove a job, keeping the order of the remaining ones
    pub fn remove(&mut self, name: &str) -> Option<Job> {
        self.jobs.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.jobs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
