use std::collections::{BTreeMap, HashMap};

use chrono::DateTime;
use serde::Serialize;
use tracing::debug;

use crate::models::{
    DiaryLesson, DiaryPayload, HOMEWORK_CATEGORY, MARK_CATEGORY_FALLBACK, SUBJECT_FALLBACK,
};
use crate::teachers::{self, TeacherMap};
use crate::timetable;

/// One reconciled lesson occurrence, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonView {
    pub id: i64,
    pub num: i64,
    pub subject: String,
    pub topic: String,
    pub teacher: String,
    pub teacher_full: String,
    pub homework: String,
    pub homework_deadline: Option<f64>,
    pub homework_files: Vec<HomeworkFileView>,
    pub mark: Option<String>,
    pub mark_description: Option<String>,
    pub mark_weight: Option<f64>,
    pub start_time: String,
    pub end_time: String,
}

impl LessonView {
    /// Snapshot of this lesson with a specific mark substituted in; the
    /// grade history emits one such snapshot per retained mark.
    pub fn with_mark(&self, value: Option<String>, description: Option<String>) -> LessonView {
        LessonView {
            mark: value,
            mark_description: description,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkFileView {
    pub id: i64,
    pub name: String,
    pub variant_id: i64,
}

/// Complete result of one schedule reconciliation run. Built off to the
/// side and merged into the session caches in one step; nothing here
/// touches shared state.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleBatch {
    /// ISO date key → lessons for that day, ordered by slot number.
    pub days: BTreeMap<String, Vec<LessonView>>,
    pub discovered_teachers: TeacherMap,
}

#[derive(Debug, Clone)]
struct MarkIndexEntry {
    value: String,
    description: String,
    part_id: Option<i64>,
}

/// Calendar day (UTC) for an epoch-ms timestamp, as an ISO date string.
pub fn day_key(epoch_ms: f64) -> Option<String> {
    DateTime::from_timestamp_millis(epoch_ms as i64)
        .map(|dt| dt.date_naive().format("%Y-%m-%d").to_string())
}

/// Joins a diary window payload into day-bucketed lesson views.
///
/// The per-lesson mark is singular: the top-level mark records are indexed
/// by lesson id in input order and later records overwrite earlier ones.
/// The grade-history path keeps every mark instead; the two policies are
/// deliberate and must stay separate.
pub fn reconcile(payload: &DiaryPayload, session_teachers: &TeacherMap) -> ScheduleBatch {
    let mut marks_index: HashMap<i64, MarkIndexEntry> = HashMap::new();
    for user in payload.user.as_deref().unwrap_or_default() {
        for mark in user.mark.as_deref().unwrap_or_default() {
            let (Some(lesson_id), Some(value)) = (mark.lesson_id, &mark.value) else {
                continue;
            };
            marks_index.insert(
                lesson_id,
                MarkIndexEntry {
                    value: value.clone(),
                    description: mark
                        .part_type
                        .clone()
                        .unwrap_or_else(|| MARK_CATEGORY_FALLBACK.to_string()),
                    part_id: mark.part_id,
                },
            );
        }
    }

    let lessons = payload.lesson.as_deref().unwrap_or_default();
    let batch_teachers = teachers::seed_batch(lessons);

    let mut days: BTreeMap<String, Vec<LessonView>> = BTreeMap::new();
    for raw in lessons {
        let (Some(date_ms), Some(lesson_id)) = (raw.date, raw.id) else {
            continue;
        };
        let Some(key) = day_key(date_ms) else { continue };

        let mark_info = marks_index.get(&lesson_id);
        let homework = resolve_homework(raw, true);
        // Weight is only meaningful here when the lesson's mark is pinned to
        // a part; ungraded lessons keep no weight on this path.
        let mark_weight = if mark_info.and_then(|m| m.part_id).is_some() {
            resolve_weight(raw)
        } else {
            None
        };

        let num = raw.num_in_day.unwrap_or(0);
        let (start_time, end_time) = timetable::lesson_times(num);
        let names = teachers::resolve(raw, &batch_teachers, session_teachers);

        let view = LessonView {
            id: lesson_id,
            num,
            subject: subject_name(raw).to_string(),
            topic: raw.subject.clone().unwrap_or_default(),
            teacher: names.short,
            teacher_full: names.full,
            homework: homework.text,
            homework_deadline: homework.deadline,
            homework_files: homework.files,
            mark: mark_info.map(|m| m.value.clone()),
            mark_description: mark_info.map(|m| m.description.clone()),
            mark_weight,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
        };
        days.entry(key).or_default().push(view);
    }

    for bucket in days.values_mut() {
        bucket.sort_by_key(|l| l.num);
    }

    debug!(
        lessons = lessons.len(),
        days = days.len(),
        teachers = batch_teachers.len(),
        "schedule reconciled"
    );

    ScheduleBatch {
        days,
        discovered_teachers: batch_teachers,
    }
}

pub(crate) fn subject_name(lesson: &DiaryLesson) -> &str {
    lesson
        .unit
        .as_ref()
        .and_then(|u| u.name.as_deref())
        .unwrap_or(SUBJECT_FALLBACK)
}

pub(crate) struct ResolvedHomework {
    pub text: String,
    pub deadline: Option<f64>,
    pub files: Vec<HomeworkFileView>,
}

/// Walks the homework parts in order. Text and deadline follow
/// last-non-empty-wins across variants; files accumulate from every
/// variant, including ones whose text lost the overwrite race or was empty.
pub(crate) fn resolve_homework(lesson: &DiaryLesson, collect_files: bool) -> ResolvedHomework {
    let mut text = String::new();
    let mut deadline: Option<f64> = None;
    let mut files: Vec<HomeworkFileView> = Vec::new();

    for part in lesson.part.as_deref().unwrap_or_default() {
        if part.cat.as_deref() != Some(HOMEWORK_CATEGORY) {
            continue;
        }
        for variant in part.variant.as_deref().unwrap_or_default() {
            if let Some(raw_text) = &variant.text {
                let clean = crate::normalize::strip_markup(raw_text);
                if !clean.is_empty() {
                    text = clean;
                    deadline = variant.dead_line;
                }
            }
            if !collect_files {
                continue;
            }
            // A variant without an id cannot address its files on the
            // backend, so such files are unusable and skipped.
            let Some(variant_id) = variant.id else { continue };
            for file in variant.file.as_deref().unwrap_or_default() {
                let (Some(id), Some(name)) = (file.id, &file.file_name) else {
                    continue;
                };
                files.push(HomeworkFileView {
                    id,
                    name: name.clone(),
                    variant_id,
                });
            }
        }
    }

    ResolvedHomework {
        text,
        deadline,
        files,
    }
}

/// Last part exposing a weight wins, regardless of category.
pub(crate) fn resolve_weight(lesson: &DiaryLesson) -> Option<f64> {
    let mut weight = None;
    for part in lesson.part.as_deref().unwrap_or_default() {
        if let Some(wt) = part.mrk_wt {
            weight = Some(wt);
        }
    }
    weight
}
