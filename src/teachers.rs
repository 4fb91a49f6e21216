use std::collections::HashMap;

use crate::models::{DiaryLesson, TeacherRecord, SUBJECT_FALLBACK, TEACHER_FALLBACK};

/// Resolved short ("Last F.M.") and full ("Last First Middle") teacher names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeacherNames {
    pub short: String,
    pub full: String,
}

/// Subject display name → resolved teacher names.
pub type TeacherMap = HashMap<String, TeacherNames>;

impl TeacherNames {
    /// Derives both name forms from a structured attribution record. When
    /// any of the three name fields is missing the short form degrades to
    /// the backend's own fallback string, which [`short_is_absent`] treats
    /// as no attribution at all.
    pub fn from_record(rec: &TeacherRecord) -> TeacherNames {
        let short = match (&rec.last_name, &rec.first_name, &rec.middle_name) {
            (Some(last), Some(first), Some(middle)) => {
                format!("{} {}.{}.", last, initial(first), initial(middle))
            }
            _ => rec
                .fact_teacher_in
                .clone()
                .unwrap_or_else(|| TEACHER_FALLBACK.to_string()),
        };

        let parts: Vec<&str> = [&rec.last_name, &rec.first_name, &rec.middle_name]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .collect();
        let full = if parts.is_empty() {
            rec.fact_teacher_in.clone().unwrap_or_default()
        } else {
            parts.join(" ")
        };

        TeacherNames { short, full }
    }
}

fn initial(name: &str) -> String {
    name.chars().next().map(|c| c.to_string()).unwrap_or_default()
}

/// A short form equal to the backend's fallback string, or empty, carries no
/// information.
pub fn short_is_absent(short: &str) -> bool {
    short.is_empty() || short == TEACHER_FALLBACK
}

/// Derives a short form from a flat "Last First Middle" attribution string.
/// Strings with fewer than three tokens pass through unchanged.
pub fn short_from_fio(fio: &str) -> String {
    let parts: Vec<&str> = fio.split_whitespace().collect();
    if parts.len() >= 3 {
        format!("{} {}.{}.", parts[0], initial(parts[1]), initial(parts[2]))
    } else {
        fio.to_string()
    }
}

/// First pass of a reconciliation run: any lesson carrying a usable
/// attribution seeds the batch cache for its subject. Runs over the whole
/// batch before any lesson is resolved, so resolution is independent of
/// input order; for a subject attributed more than once the last lesson in
/// input order wins.
pub fn seed_batch(lessons: &[DiaryLesson]) -> TeacherMap {
    let mut discovered = TeacherMap::new();
    for lesson in lessons {
        let (Some(unit), Some(teacher)) = (&lesson.unit, &lesson.teacher) else {
            continue;
        };
        let Some(name) = &unit.name else { continue };
        let names = TeacherNames::from_record(teacher);
        if !short_is_absent(&names.short) {
            discovered.insert(name.clone(), names);
        }
    }
    discovered
}

/// Resolves a lesson's teacher: its own attribution when usable, otherwise
/// the batch cache, otherwise the session cache, otherwise empty names.
pub fn resolve(lesson: &DiaryLesson, batch: &TeacherMap, session: &TeacherMap) -> TeacherNames {
    if let Some(teacher) = &lesson.teacher {
        let own = TeacherNames::from_record(teacher);
        if !short_is_absent(&own.short) {
            return own;
        }
    }

    let subject = lesson
        .unit
        .as_ref()
        .and_then(|u| u.name.as_deref())
        .unwrap_or(SUBJECT_FALLBACK);
    if let Some(found) = batch.get(subject).or_else(|| session.get(subject)) {
        return found.clone();
    }
    TeacherNames::default()
}
