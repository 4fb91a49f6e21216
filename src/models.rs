use serde::{Deserialize, Deserializer};

// Raw payload shapes for the four endpoint classes the session collaborator
// fetches. Every field is optional: the backend omits anything it has no
// data for, and a sparse record must still decode. Field names mirror the
// wire names, including the backend's irregular casings.

/// Diary window payload: lesson occurrences plus per-user top-level marks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiaryPayload {
    pub lesson: Option<Vec<DiaryLesson>>,
    pub user: Option<Vec<UserMarks>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryLesson {
    pub id: Option<i64>,
    /// Epoch milliseconds.
    pub date: Option<f64>,
    pub num_in_day: Option<i64>,
    pub unit: Option<UnitRef>,
    pub teacher: Option<TeacherRecord>,
    /// Flat "Last First Middle" attribution, present when `teacher` is not.
    pub teacher_fio: Option<String>,
    /// Topic text for the occurrence (the wire calls it `subject`).
    pub subject: Option<String>,
    pub part: Option<Vec<LessonPart>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitRef {
    pub name: Option<String>,
    pub short: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherRecord {
    #[serde(rename = "factTeacherIN")]
    pub fact_teacher_in: Option<String>,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPart {
    /// Category tag; homework parts carry [`HOMEWORK_CATEGORY`].
    pub cat: Option<String>,
    pub variant: Option<Vec<PartVariant>>,
    pub mrk_wt: Option<f64>,
    pub mark: Option<Vec<PartMark>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartVariant {
    pub id: Option<i64>,
    pub text: Option<String>,
    pub file: Option<Vec<VariantFile>>,
    /// Epoch milliseconds.
    pub dead_line: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantFile {
    pub id: Option<i64>,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartMark {
    pub mark_id: Option<i64>,
    pub mark_value: Option<String>,
    /// `%Y-%m-%dT%H:%M:%S`, no timezone.
    pub mark_dt: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserMarks {
    pub id: Option<i64>,
    pub mark: Option<Vec<TopMark>>,
}

/// Top-level mark record referencing a lesson by id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopMark {
    pub id: Option<i64>,
    pub value: Option<String>,
    #[serde(rename = "lessonID")]
    pub lesson_id: Option<i64>,
    pub part_type: Option<String>,
    #[serde(rename = "partID")]
    pub part_id: Option<i64>,
}

/// One node of the grading-period tree. Depth is unbounded; the root node
/// for a class is a container whose `items` hold the real periods.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodNode {
    pub id: Option<i64>,
    pub name: Option<String>,
    /// Interval start/end, epoch milliseconds.
    pub date1: Option<f64>,
    pub date2: Option<f64>,
    pub parent_id: Option<i64>,
    pub items: Option<Vec<PeriodNode>>,
    pub type_code: Option<String>,
}

/// Class/group membership entry for the current user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupInfo {
    pub group_id: Option<i64>,
    pub group_name: Option<String>,
    pub beg_date: Option<f64>,
}

/// Subject roster entry. `unit_name` is the only join key the backend
/// offers against diary lessons.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSummary {
    pub unit_id: Option<i64>,
    pub unit_name: Option<String>,
    pub over_mark: Option<f64>,
    /// Served as either a number or a numeric string.
    #[serde(default, deserialize_with = "f64_or_numeric_str")]
    pub total_mark: Option<f64>,
    pub rating: Option<String>,
}

fn f64_or_numeric_str<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(f64),
        Str(String),
    }
    Ok(match Option::<NumOrStr>::deserialize(de)? {
        None => None,
        Some(NumOrStr::Num(v)) => Some(v),
        Some(NumOrStr::Str(s)) => s.trim().parse::<f64>().ok(),
    })
}

/// Part category tag for homework.
pub const HOMEWORK_CATEGORY: &str = "DZ";
/// Sentinel the backend substitutes when it has no teacher attribution.
pub const TEACHER_FALLBACK: &str = "Учитель";
/// Display name used when a lesson carries no subject roster reference.
pub const SUBJECT_FALLBACK: &str = "Предмет";
/// Category label used when a mark record carries none.
pub const MARK_CATEGORY_FALLBACK: &str = "Оценка";

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sparse_lesson_decodes() {
        let lesson: DiaryLesson = serde_json::from_value(json!({ "id": 7 })).unwrap();
        assert_eq!(lesson.id, Some(7));
        assert!(lesson.date.is_none());
        assert!(lesson.part.is_none());
    }

    #[test]
    fn irregular_wire_casings_decode() {
        let mark: TopMark = serde_json::from_value(json!({
            "value": "5", "lessonID": 55, "partType": "Ответ на уроке", "partID": 3
        }))
        .unwrap();
        assert_eq!(mark.lesson_id, Some(55));
        assert_eq!(mark.part_id, Some(3));

        let teacher: TeacherRecord =
            serde_json::from_value(json!({ "factTeacherIN": "Учитель" })).unwrap();
        assert_eq!(teacher.fact_teacher_in.as_deref(), Some("Учитель"));

        let variant: PartVariant =
            serde_json::from_value(json!({ "deadLine": 1700000000000.0 })).unwrap();
        assert_eq!(variant.dead_line, Some(1700000000000.0));
    }

    #[test]
    fn total_mark_decodes_from_number_or_string() {
        let from_num: UnitSummary =
            serde_json::from_value(json!({ "unitId": 1, "totalMark": 4.67 })).unwrap();
        let from_str: UnitSummary =
            serde_json::from_value(json!({ "unitId": 1, "totalMark": "4.67" })).unwrap();
        assert_eq!(from_num.total_mark, Some(4.67));
        assert_eq!(from_str.total_mark, Some(4.67));

        let junk: UnitSummary =
            serde_json::from_value(json!({ "unitId": 1, "totalMark": "n/a" })).unwrap();
        assert_eq!(junk.total_mark, None);
    }
}
