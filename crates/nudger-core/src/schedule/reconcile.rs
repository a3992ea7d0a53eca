//! Backend entries -> logical preferences.
//!
//! Entries sharing `(title, time, frequency, end_date)` are treated as
//! fragments of one preference. Two reminders the user created separately
//! with identical values for all four collapse into one; the backend carries
//! no group identifier to tell them apart.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::error::ReconcileError;
use crate::gateway::BackendEntry;
use crate::schedule::{Frequency, NotificationPreference};

type GroupKey<'a> = (&'a str, &'a str, &'a str, Option<&'a str>);

/// Fold backend entries into preferences, in order of first appearance.
///
/// Fails on the first group whose frequency is not a known kind rather than
/// dropping it.
pub fn reconcile(entries: &[BackendEntry]) -> Result<Vec<NotificationPreference>, ReconcileError> {
    let mut groups: IndexMap<GroupKey<'_>, Vec<&BackendEntry>> = IndexMap::new();
    for entry in entries {
        let key = (
            entry.title.as_str(),
            entry.time.as_str(),
            // raw text: "Weekly" and "weekly" stay separate groups
            entry.frequency.as_str(),
            entry.end_date.as_deref(),
        );
        groups.entry(key).or_default().push(entry);
    }

    groups.into_values().map(|group| fold_group(&group)).collect()
}

fn fold_group(group: &[&BackendEntry]) -> Result<NotificationPreference, ReconcileError> {
    // groups are never empty: every key was created by pushing an entry
    let first = group[0];
    let frequency: Frequency =
        first
            .frequency
            .parse()
            .map_err(|_| ReconcileError::UnknownFrequency {
                entry_id: first.id,
                frequency: first.frequency.clone(),
            })?;

    let days_of_week: BTreeSet<u8> = if frequency == Frequency::Weekly {
        group.iter().filter_map(|e| e.day_of_week).collect()
    } else {
        first.day_of_week.into_iter().collect()
    };

    Ok(NotificationPreference {
        id: first.id.to_string(),
        title: first.title.clone(),
        time: first.time.clone(),
        frequency,
        days_of_week,
        day_of_month: first.day_of_month,
        end_date: first.end_date.clone(),
        job_ids: group.iter().filter_map(|e| e.job_id.clone()).collect(),
    })
}
