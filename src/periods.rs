use serde::{Deserialize, Serialize};

use crate::models::{GroupInfo, PeriodNode};

/// Type codes of the two selectable granularities; anything else is a
/// pass-through container.
const TYPE_QUARTER: &str = "Q";
const TYPE_HALF_YEAR: &str = "HY";

/// One class's grading-period tree, as assembled by the collaborator from
/// the membership list and the per-class period endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassPeriods {
    #[serde(flatten)]
    pub group: GroupInfo,
    /// Root node; its `items` hold the selectable hierarchy.
    pub periods: Option<PeriodNode>,
}

/// A flattened, depth-annotated period the user can select.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectablePeriod {
    pub group_id: i64,
    pub group_name: String,
    pub period_id: Option<i64>,
    pub name: String,
    pub date1: Option<f64>,
    pub date2: Option<f64>,
    pub type_code: String,
    pub depth: i64,
    /// First flattened entry of its class, shown with the class name.
    pub is_root: bool,
}

/// Flattens every class's period tree into one selectable list.
///
/// Classes are visited newest-first by begin date; `only_current` restricts
/// the output to the newest class. Within a class, siblings sort ascending
/// by start timestamp, only quarter/half-year nodes are emitted, and
/// containers contribute traversal but no depth.
pub fn flatten_groups(classes: &[ClassPeriods], only_current: bool) -> Vec<SelectablePeriod> {
    let mut ordered: Vec<&ClassPeriods> = classes.iter().collect();
    ordered.sort_by(|a, b| {
        b.group
            .beg_date
            .unwrap_or(0.0)
            .total_cmp(&a.group.beg_date.unwrap_or(0.0))
    });
    if only_current {
        ordered.truncate(1);
    }

    let mut out = Vec::new();
    for class in ordered {
        let Some(group_id) = class.group.group_id else { continue };
        let group_name = class
            .group
            .group_name
            .clone()
            .unwrap_or_else(|| format!("Group {group_id}"));

        let first_of_class = out.len();
        let children = class
            .periods
            .as_ref()
            .and_then(|root| root.items.as_deref())
            .unwrap_or_default();
        flatten_level(children, 0, group_id, &group_name, &mut out);
        if let Some(first) = out.get_mut(first_of_class) {
            first.is_root = true;
        }
    }
    out
}

fn flatten_level(
    nodes: &[PeriodNode],
    depth: i64,
    group_id: i64,
    group_name: &str,
    out: &mut Vec<SelectablePeriod>,
) {
    let mut sorted: Vec<&PeriodNode> = nodes.iter().collect();
    sorted.sort_by(|a, b| a.date1.unwrap_or(0.0).total_cmp(&b.date1.unwrap_or(0.0)));

    for node in sorted {
        let code = node.type_code.as_deref().unwrap_or("");
        let selectable = code == TYPE_QUARTER || code == TYPE_HALF_YEAR;
        if selectable {
            out.push(SelectablePeriod {
                group_id,
                group_name: group_name.to_string(),
                period_id: node.id,
                name: node.name.clone().unwrap_or_default(),
                date1: node.date1,
                date2: node.date2,
                type_code: code.to_string(),
                depth,
                is_root: false,
            });
        }
        if let Some(children) = node.items.as_deref() {
            let next_depth = if selectable { depth + 1 } else { depth };
            flatten_level(children, next_depth, group_id, group_name, out);
        }
    }
}

/// Default-selection contract: a still-present previously saved period id
/// wins; else the period whose interval contains `now_ms`; else the first
/// entry.
pub fn choose_default(
    periods: &[SelectablePeriod],
    saved_id: Option<i64>,
    now_ms: f64,
) -> Option<usize> {
    if let Some(saved) = saved_id.filter(|id| *id != 0) {
        if let Some(idx) = periods.iter().position(|p| p.period_id == Some(saved)) {
            return Some(idx);
        }
    }
    if let Some(idx) = periods.iter().position(|p| match (p.date1, p.date2) {
        (Some(d1), Some(d2)) => now_ms >= d1 && now_ms <= d2,
        _ => false,
    }) {
        return Some(idx);
    }
    if periods.is_empty() {
        None
    } else {
        Some(0)
    }
}
