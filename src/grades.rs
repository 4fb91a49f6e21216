use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use crate::models::{DiaryPayload, UnitSummary, MARK_CATEGORY_FALLBACK, SUBJECT_FALLBACK};
use crate::schedule::{self, LessonView};
use crate::teachers;

/// Grade history for one roster subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectHistory {
    pub id: i64,
    pub name: String,
    pub average: Option<f64>,
    pub rating: Option<String>,
    /// Full name of the first attributed teacher among the joined lessons.
    pub teacher: Option<String>,
    /// All retained marks, ordered by resolved date.
    pub marks: Vec<MarkView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkView {
    pub value: String,
    /// Resolved date, epoch milliseconds: the mark's own timestamp when it
    /// has one, else the lesson's date.
    pub date: f64,
    pub lesson: LessonView,
}

#[derive(Debug, Clone)]
struct MarkEntry {
    value: String,
    date_ms: Option<f64>,
    description: String,
    part_id: Option<i64>,
}

const MARK_DT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn parse_mark_dt(raw: &str) -> Option<f64> {
    NaiveDateTime::parse_from_str(raw, MARK_DT_FORMAT)
        .ok()
        .map(|dt| dt.and_utc().timestamp_millis() as f64)
}

/// Joins diary lessons against the subject roster into per-subject grade
/// histories.
///
/// Unlike the schedule path, every mark is retained: top-level records and
/// in-part records append to the same per-lesson list and nothing is
/// overwritten. The roster join is by exact display-name equality — the
/// backend offers no numeric bridge — and a lesson with no roster match is
/// silently excluded. Weight here is the last weight any part exposes,
/// whether or not the lesson is graded.
pub fn aggregate(units: &[UnitSummary], payload: &DiaryPayload) -> Vec<SubjectHistory> {
    let mut marks_by_lesson: HashMap<i64, Vec<MarkEntry>> = HashMap::new();
    for user in payload.user.as_deref().unwrap_or_default() {
        for mark in user.mark.as_deref().unwrap_or_default() {
            let (Some(lesson_id), Some(value)) = (mark.lesson_id, &mark.value) else {
                continue;
            };
            marks_by_lesson.entry(lesson_id).or_default().push(MarkEntry {
                value: value.clone(),
                date_ms: None,
                description: mark
                    .part_type
                    .clone()
                    .unwrap_or_else(|| MARK_CATEGORY_FALLBACK.to_string()),
                part_id: mark.part_id,
            });
        }
    }

    let lessons = payload.lesson.as_deref().unwrap_or_default();

    let mut lesson_views: HashMap<i64, LessonView> = HashMap::new();
    for raw in lessons {
        let Some(lesson_id) = raw.id else { continue };

        for part in raw.part.as_deref().unwrap_or_default() {
            for mark in part.mark.as_deref().unwrap_or_default() {
                let Some(value) = &mark.mark_value else { continue };
                marks_by_lesson.entry(lesson_id).or_default().push(MarkEntry {
                    value: value.clone(),
                    date_ms: mark.mark_dt.as_deref().and_then(parse_mark_dt),
                    description: part
                        .cat
                        .clone()
                        .unwrap_or_else(|| MARK_CATEGORY_FALLBACK.to_string()),
                    part_id: None,
                });
            }
        }

        let homework = schedule::resolve_homework(raw, false);
        let weight = schedule::resolve_weight(raw);

        let (mut short, mut full) = match &raw.teacher {
            Some(rec) => {
                let names = teachers::TeacherNames::from_record(rec);
                (names.short, names.full)
            }
            None => (String::new(), String::new()),
        };
        if short.is_empty() {
            if let Some(fio) = &raw.teacher_fio {
                full = fio.clone();
                short = teachers::short_from_fio(fio);
            }
        }

        // The last merged entry stands in as the lesson's own mark; each
        // emitted history row substitutes its specific one.
        let last = marks_by_lesson.get(&lesson_id).and_then(|v| v.last());

        lesson_views.insert(
            lesson_id,
            LessonView {
                id: lesson_id,
                num: raw.num_in_day.unwrap_or(0),
                subject: schedule::subject_name(raw).to_string(),
                topic: raw.subject.clone().unwrap_or_default(),
                teacher: short,
                teacher_full: full,
                homework: homework.text,
                homework_deadline: homework.deadline,
                homework_files: Vec::new(),
                mark: last.map(|m| m.value.clone()),
                mark_description: last.map(|m| m.description.clone()),
                mark_weight: weight,
                start_time: String::new(),
                end_time: String::new(),
            },
        );
    }

    let mut seen_names: HashSet<&str> = HashSet::new();
    for unit in units {
        if let Some(name) = unit.unit_name.as_deref() {
            if !seen_names.insert(name) {
                debug!(subject = name, "duplicate roster display name; first match wins");
            }
        }
    }

    let mut unit_marks: HashMap<i64, Vec<MarkView>> = HashMap::new();
    let mut unit_teachers: HashMap<i64, String> = HashMap::new();
    for raw in lessons {
        let (Some(lesson_id), Some(date_ms)) = (raw.id, raw.date) else {
            continue;
        };
        let Some(subject) = raw.unit.as_ref().and_then(|u| u.name.as_deref()) else {
            continue;
        };
        let Some(view) = lesson_views.get(&lesson_id) else {
            continue;
        };
        // Join-miss: not an error, the lesson's marks just never surface.
        let Some(unit) = units
            .iter()
            .find(|u| u.unit_name.as_deref() == Some(subject))
        else {
            continue;
        };
        let unit_id = unit.unit_id.unwrap_or(0);

        if !view.teacher_full.is_empty() {
            unit_teachers
                .entry(unit_id)
                .or_insert_with(|| view.teacher_full.clone());
        }

        let Some(mark_list) = marks_by_lesson.get(&lesson_id) else {
            continue;
        };
        for entry in mark_list {
            unit_marks.entry(unit_id).or_default().push(MarkView {
                value: entry.value.clone(),
                date: entry.date_ms.unwrap_or(date_ms),
                lesson: view.with_mark(
                    Some(entry.value.clone()),
                    Some(entry.description.clone()),
                ),
            });
        }
    }

    units
        .iter()
        .map(|unit| {
            let unit_id = unit.unit_id.unwrap_or(0);
            let mut marks = unit_marks.get(&unit_id).cloned().unwrap_or_default();
            marks.sort_by(|a, b| a.date.total_cmp(&b.date));
            SubjectHistory {
                id: unit_id,
                name: unit
                    .unit_name
                    .clone()
                    .unwrap_or_else(|| SUBJECT_FALLBACK.to_string()),
                average: unit.over_mark,
                rating: unit.rating.clone(),
                teacher: unit_teachers.get(&unit_id).cloned(),
                marks,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(v: serde_json::Value) -> DiaryPayload {
        serde_json::from_value(v).unwrap()
    }

    fn roster(v: serde_json::Value) -> Vec<UnitSummary> {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn all_marks_are_retained() {
        let units = roster(json!([{ "unitId": 30, "unitName": "Math" }]));
        let p = payload(json!({
            "lesson": [{ "id": 55, "date": 1700000000000.0, "unit": { "name": "Math" } }],
            "user": [{
                "mark": [
                    { "value": "4", "lessonID": 55 },
                    { "value": "5", "lessonID": 55 }
                ]
            }]
        }));
        let subjects = aggregate(&units, &p);
        assert_eq!(subjects.len(), 1);
        let values: Vec<&str> = subjects[0].marks.iter().map(|m| m.value.as_str()).collect();
        assert_eq!(values, vec!["4", "5"]);
        // Each snapshot carries its own value.
        assert_eq!(subjects[0].marks[0].lesson.mark.as_deref(), Some("4"));
        assert_eq!(subjects[0].marks[1].lesson.mark.as_deref(), Some("5"));
    }

    #[test]
    fn in_part_marks_merge_with_their_own_dates() {
        let units = roster(json!([{ "unitId": 30, "unitName": "Math" }]));
        let p = payload(json!({
            "lesson": [{
                "id": 1, "date": 1700000000000.0, "unit": { "name": "Math" },
                "part": [{
                    "cat": "Тест",
                    "mark": [{ "markValue": "3", "markDt": "2023-11-01T10:00:00" }]
                }]
            }],
            "user": [{ "mark": [{ "value": "5", "lessonID": 1 }] }]
        }));
        let subjects = aggregate(&units, &p);
        let marks = &subjects[0].marks;
        assert_eq!(marks.len(), 2);
        // The in-part mark's own timestamp (Nov 1) sorts before the
        // top-level mark, which falls back to the lesson date (Nov 14).
        assert_eq!(marks[0].value, "3");
        assert_eq!(marks[0].lesson.mark_description.as_deref(), Some("Тест"));
        assert_eq!(marks[1].value, "5");
        assert_eq!(marks[1].date, 1700000000000.0);
    }

    #[test]
    fn roster_miss_is_silent_exclusion() {
        let units = roster(json!([{ "unitId": 30, "unitName": "Math" }]));
        let p = payload(json!({
            "lesson": [{ "id": 1, "date": 1700000000000.0, "unit": { "name": "История" } }],
            "user": [{ "mark": [{ "value": "5", "lessonID": 1 }] }]
        }));
        let subjects = aggregate(&units, &p);
        assert_eq!(subjects.len(), 1);
        assert!(subjects[0].marks.is_empty());
    }

    #[test]
    fn join_is_case_sensitive() {
        let units = roster(json!([{ "unitId": 30, "unitName": "math" }]));
        let p = payload(json!({
            "lesson": [{ "id": 1, "date": 1700000000000.0, "unit": { "name": "Math" } }],
            "user": [{ "mark": [{ "value": "5", "lessonID": 1 }] }]
        }));
        assert!(aggregate(&units, &p)[0].marks.is_empty());
    }

    #[test]
    fn roster_subject_without_lessons_yields_empty_history() {
        let units = roster(json!([
            { "unitId": 30, "unitName": "Math", "overMark": 4.5, "rating": "3" }
        ]));
        let subjects = aggregate(&units, &DiaryPayload::default());
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].id, 30);
        assert_eq!(subjects[0].average, Some(4.5));
        assert_eq!(subjects[0].rating.as_deref(), Some("3"));
        assert!(subjects[0].marks.is_empty());
    }

    #[test]
    fn weight_does_not_require_a_part_scoped_mark() {
        let units = roster(json!([{ "unitId": 30, "unitName": "Math" }]));
        let p = payload(json!({
            "lesson": [{
                "id": 1, "date": 1700000000000.0, "unit": { "name": "Math" },
                "part": [{ "cat": "X", "mrkWt": 2.0 }, { "cat": "Y", "mrkWt": 3.0 }]
            }],
            "user": [{ "mark": [{ "value": "5", "lessonID": 1 }] }]
        }));
        let subjects = aggregate(&units, &p);
        assert_eq!(subjects[0].marks[0].lesson.mark_weight, Some(3.0));
    }

    #[test]
    fn teacher_fio_fallback_applies() {
        let units = roster(json!([{ "unitId": 30, "unitName": "Math" }]));
        let p = payload(json!({
            "lesson": [{
                "id": 1, "date": 1700000000000.0, "unit": { "name": "Math" },
                "teacherFio": "Иванов Иван Иванович"
            }],
            "user": [{ "mark": [{ "value": "5", "lessonID": 1 }] }]
        }));
        let subjects = aggregate(&units, &p);
        assert_eq!(subjects[0].teacher.as_deref(), Some("Иванов Иван Иванович"));
        assert_eq!(subjects[0].marks[0].lesson.teacher, "Иванов И.И.");
    }

    #[test]
    fn first_attributed_teacher_wins_per_unit() {
        let units = roster(json!([{ "unitId": 30, "unitName": "Math" }]));
        let p = payload(json!({
            "lesson": [
                { "id": 1, "date": 1700000000000.0, "unit": { "name": "Math" },
                  "teacherFio": "Иванов Иван Иванович" },
                { "id": 2, "date": 1700090000000.0, "unit": { "name": "Math" },
                  "teacherFio": "Петров Пётр Петрович" }
            ],
            "user": [{ "mark": [
                { "value": "5", "lessonID": 1 },
                { "value": "4", "lessonID": 2 }
            ]}]
        }));
        let subjects = aggregate(&units, &p);
        assert_eq!(subjects[0].teacher.as_deref(), Some("Иванов Иван Иванович"));
    }

    #[test]
    fn aggregate_is_idempotent() {
        let units = roster(json!([{ "unitId": 30, "unitName": "Math", "overMark": 4.0 }]));
        let p = payload(json!({
            "lesson": [{
                "id": 1, "date": 1700000000000.0, "unit": { "name": "Math" },
                "part": [{ "cat": "DZ", "variant": [{ "id": 2, "text": "<i>read</i>" }] }]
            }],
            "user": [{ "mark": [{ "value": "5", "lessonID": 1 }] }]
        }));
        let a = aggregate(&units, &p);
        let b = aggregate(&units, &p);
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
