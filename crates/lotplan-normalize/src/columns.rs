//! Column resolution
//!
//! Maps the six logical [`Field`]s onto header positions, either by exact
//! header name or by case-insensitive substring.

use lotplan_core::{Field, NormalizeError};
use serde::{Deserialize, Serialize};

/// How one field finds its column
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnRule<'a> {
    /// Header equal to the name (after trimming)
    Exact(&'a str),
    /// First header containing the needle, ignoring case
    Contains(&'a str),
}

/// Position of the column matching `rule`, if any
pub fn resolve(columns: &[String], rule: ColumnRule<'_>) -> Option<usize> {
    match rule {
        ColumnRule::Exact(name) => columns.iter().position(|c| c.trim() == name),
        ColumnRule::Contains(needle) => {
            let needle = needle.to_lowercase();
            columns
                .iter()
                .position(|c| c.to_lowercase().contains(&needle))
        }
    }
}

/// Fixed header names
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExactColumns {
    pub resource: String,
    pub lot: String,
    pub product: String,
    pub date: String,
    pub time: String,
    pub run_time: String,
}

impl Default for ExactColumns {
    fn default() -> Self {
        Self {
            resource: "salle".into(),
            lot: "lot".into(),
            product: "Produit".into(),
            date: "Date Start".into(),
            time: "Time Start".into(),
            run_time: "Run Time".into(),
        }
    }
}

/// Substrings searched for in header names
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyColumns {
    pub resource: String,
    pub lot: String,
    pub product: String,
    pub date: String,
    pub time: String,
    pub run_time: String,
}

impl Default for FuzzyColumns {
    fn default() -> Self {
        Self {
            resource: "resource".into(),
            lot: "order".into(),
            product: "desc".into(),
            date: "date".into(),
            time: "time".into(),
            run_time: "run".into(),
        }
    }
}

/// Column resolution policy
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ColumnPolicy {
    Exact(ExactColumns),
    Fuzzy(FuzzyColumns),
}

impl Default for ColumnPolicy {
    fn default() -> Self {
        ColumnPolicy::Exact(ExactColumns::default())
    }
}

impl ColumnPolicy {
    pub fn fuzzy() -> Self {
        ColumnPolicy::Fuzzy(FuzzyColumns::default())
    }

    /// The rule used to find `field`
    pub fn rule(&self, field: Field) -> ColumnRule<'_> {
        match self {
            ColumnPolicy::Exact(names) => ColumnRule::Exact(pick(
                field,
                &names.resource,
                &names.lot,
                &names.product,
                &names.date,
                &names.time,
                &names.run_time,
            )),
            ColumnPolicy::Fuzzy(needles) => ColumnRule::Contains(pick(
                field,
                &needles.resource,
                &needles.lot,
                &needles.product,
                &needles.date,
                &needles.time,
                &needles.run_time,
            )),
        }
    }
}

fn pick<'a>(
    field: Field,
    resource: &'a str,
    lot: &'a str,
    product: &'a str,
    date: &'a str,
    time: &'a str,
    run_time: &'a str,
) -> &'a str {
    match field {
        Field::Resource => resource,
        Field::Lot => lot,
        Field::Product => product,
        Field::Date => date,
        Field::Time => time,
        Field::RunTime => run_time,
    }
}

/// Resolved positions of all six fields
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnMap {
    indices: [usize; 6],
}

impl ColumnMap {
    pub fn get(&self, field: Field) -> usize {
        self.indices[field_slot(field)]
    }
}

fn field_slot(field: Field) -> usize {
    match field {
        Field::Resource => 0,
        Field::Lot => 1,
        Field::Product => 2,
        Field::Date => 3,
        Field::Time => 4,
        Field::RunTime => 5,
    }
}

/// Resolve every field or report all the names that could not be found
pub fn resolve_columns(
    headers: &[String],
    policy: &ColumnPolicy,
) -> Result<ColumnMap, NormalizeError> {
    let mut indices = [0usize; 6];
    let mut missing = Vec::new();

    for field in Field::ALL {
        let rule = policy.rule(field);
        match resolve(headers, rule) {
            Some(idx) => indices[field_slot(field)] = idx,
            None => missing.push(match rule {
                ColumnRule::Exact(name) | ColumnRule::Contains(name) => name.to_string(),
            }),
        }
    }

    if missing.is_empty() {
        Ok(ColumnMap { indices })
    } else {
        Err(NormalizeError::MissingColumns(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exact_match_is_case_sensitive() {
        let cols = headers(&["salle", "Lot"]);
        assert_eq!(resolve(&cols, ColumnRule::Exact("salle")), Some(0));
        assert_eq!(resolve(&cols, ColumnRule::Exact("lot")), None);
    }

    #[test]
    fn contains_match_ignores_case_and_takes_first() {
        let cols = headers(&["Resource", "Work Order", "Start Date", "Start Time", "Run Time"]);
        assert_eq!(resolve(&cols, ColumnRule::Contains("order")), Some(1));
        assert_eq!(resolve(&cols, ColumnRule::Contains("TIME")), Some(3));
        assert_eq!(resolve(&cols, ColumnRule::Contains("desc")), None);
    }

    #[test]
    fn resolves_default_exact_headers() {
        let cols = headers(&["Date Start", "Time Start", "Run Time", "salle", "lot", "Produit"]);
        let map = resolve_columns(&cols, &ColumnPolicy::default()).unwrap();
        assert_eq!(map.get(Field::Resource), 3);
        assert_eq!(map.get(Field::Lot), 4);
        assert_eq!(map.get(Field::Product), 5);
        assert_eq!(map.get(Field::Date), 0);
        assert_eq!(map.get(Field::Time), 1);
        assert_eq!(map.get(Field::RunTime), 2);
    }

    #[test]
    fn exact_missing_columns_are_listed_in_field_order() {
        let cols = headers(&["salle", "lot", "Date Start"]);
        let err = resolve_columns(&cols, &ColumnPolicy::default()).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::MissingColumns(vec![
                "Produit".into(),
                "Time Start".into(),
                "Run Time".into()
            ])
        );
    }

    #[test]
    fn exact_single_missing_column() {
        let cols = headers(&["salle", "lot", "Date Start", "Time Start", "Run Time"]);
        let err = resolve_columns(&cols, &ColumnPolicy::default()).unwrap_err();
        assert_eq!(err, NormalizeError::MissingColumns(vec!["Produit".into()]));
    }

    #[test]
    fn fuzzy_policy_resolves_erp_export() {
        let cols = headers(&[
            "Resource Name",
            "Production Order",
            "Item Description",
            "Planned Date",
            "Planned Time",
            "Run Qty",
        ]);
        let map = resolve_columns(&cols, &ColumnPolicy::fuzzy()).unwrap();
        assert_eq!(map.get(Field::Resource), 0);
        assert_eq!(map.get(Field::Lot), 1);
        assert_eq!(map.get(Field::Product), 2);
        assert_eq!(map.get(Field::Date), 3);
        assert_eq!(map.get(Field::Time), 4);
        assert_eq!(map.get(Field::RunTime), 5);
    }

    #[test]
    fn fuzzy_missing_reports_needles() {
        let cols = headers(&["Resource", "Order", "Date", "Time"]);
        let err = resolve_columns(&cols, &ColumnPolicy::fuzzy()).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::MissingColumns(vec!["desc".into(), "run".into()])
        );
    }

    #[test]
    fn fuzzy_time_may_land_on_run_time_column() {
        // "time" matches the first header containing it, even "Run Time"
        let cols = headers(&["Run Time", "Time Start"]);
        assert_eq!(resolve(&cols, ColumnRule::Contains("time")), Some(0));
    }

    #[test]
    fn custom_exact_names() {
        let policy = ColumnPolicy::Exact(ExactColumns {
            resource: "Room".into(),
            ..ExactColumns::default()
        });
        assert_eq!(policy.rule(Field::Resource), ColumnRule::Exact("Room"));
        assert_eq!(policy.rule(Field::Lot), ColumnRule::Exact("lot"));
    }
}
