use std::collections::BTreeMap;

use tracing::debug;

use crate::schedule::{LessonView, ScheduleBatch};
use crate::teachers::TeacherMap;

/// Mutable state scoped to one authenticated session. Reconciliation runs
/// build their result completely off to the side; [`merge_schedule`] is the
/// only writer, applied as one map union after the run finishes, so readers
/// never observe a half-merged batch. Overlapping runs are not coordinated:
/// whichever result merges last owns the day buckets both touched.
///
/// [`merge_schedule`]: SessionContext::merge_schedule
#[derive(Debug, Default)]
pub struct SessionContext {
    pub user_id: i64,
    pub prs_id: i64,
    /// Subject name → teacher names, grown across runs, cleared on logout.
    pub teachers: TeacherMap,
    /// ISO date key → reconciled lessons for that day.
    pub days: BTreeMap<String, Vec<LessonView>>,
}

impl SessionContext {
    pub fn new(user_id: i64, prs_id: i64) -> SessionContext {
        SessionContext {
            user_id,
            prs_id,
            ..SessionContext::default()
        }
    }

    /// Merges one completed run. Day buckets present in the batch replace
    /// their cached counterparts wholesale; days the batch never saw stay
    /// cached. Teacher entries overwrite per subject, never disappear.
    pub fn merge_schedule(&mut self, batch: ScheduleBatch) {
        debug!(
            new_days = batch.days.len(),
            new_teachers = batch.discovered_teachers.len(),
            "merging schedule batch"
        );
        self.teachers.extend(batch.discovered_teachers);
        self.days.extend(batch.days);
    }

    /// Lessons cached for one ISO date key; empty when the date was never
    /// part of a fetched window.
    pub fn day(&self, key: &str) -> &[LessonView] {
        self.days.get(key).map(Vec::as_slice).unwrap_or_default()
    }
}
