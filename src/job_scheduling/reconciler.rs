//! Merges the covid and news registries into the list shown on the page

use super::job_registry::JobRegistry;
use super::types::Job;
use serde::Serialize;
use std::collections::HashSet;

/// One row of the pending updates panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayUpdate {
    pub title: String,
    pub content: String,
}

/// Describe a job, e.g. `"01:23, Updates Covid & News, Repeats"`
pub fn format_update(job: &Job, covid: bool, news: bool) -> String {
    let updated: Vec<&str> = [(covid, "Covid"), (news, "News")]
        .into_iter()
        .filter_map(|(selected, label)| selected.then_some(label))
        .collect();
    let repeats = if job.repeats { "Repeats" } else { "Doesn't Repeat" };
    format!("{}, Updates {}, {}", job.time, updated.join(" & "), repeats)
}

/// Build the display list from scratch.
///
/// Covid jobs come first in registry order, then news jobs whose name was not
/// already listed. When a name is in both registries the covid job is the one
/// described and both flags are set.
pub fn build_display_list(covid: &JobRegistry, news: &JobRegistry) -> Vec<DisplayUpdate> {
    let mut seen = HashSet::new();
    let mut updates = Vec::with_capacity(covid.len() + news.len());

    for job in covid.iter().chain(news.iter()) {
        if !seen.insert(job.name.as_str()) {
            continue;
        }
        let content = format_update(job, covid.contains(&job.name), news.contains(&job.name));
        updates.push(DisplayUpdate {
            title: job.name.clone(),
            content,
        });
    }
    updates
}
