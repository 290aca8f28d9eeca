use crate::{records::item::Item, records::row::RowData};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortCriterion {
    pub attribute: String,
    pub direction: SortDirection,
}

impl SortCriterion {
    pub fn ascending(attribute: &str) -> Self {
        SortCriterion {
            attribute: attribute.to_string(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(attribute: &str) -> Self {
        SortCriterion {
            attribute: attribute.to_string(),
            direction: SortDirection::Descending,
        }
    }
}

impl std::str::FromStr for SortCriterion {
    type Err = String;

    /// Parses `attribute` or `attribute:asc|desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (attribute, direction) = match s.split_once(':') {
            Some((attr, dir)) => (attr, dir),
            None => (s, "asc"),
        };

        if attribute.is_empty() {
            return Err(format!("Missing sort attribute in '{s}'"));
        }

        let direction = match direction.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => SortDirection::Ascending,
            "desc" | "descending" => SortDirection::Descending,
            other => return Err(format!("Unknown sort direction: {other}")),
        };

        Ok(SortCriterion {
            attribute: attribute.to_string(),
            direction,
        })
    }
}

/// Compares two rows by the given criteria, first criterion first.
///
/// Nulls sort before any other value; values of incompatible types compare equal.
pub fn compare_rows(a: &RowData, b: &RowData, criteria: &[SortCriterion]) -> Ordering {
    for criterion in criteria {
        let left = a.get_value(&criterion.attribute);
        let right = b.get_value(&criterion.attribute);

        let ordering = match (left.is_null(), right.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => left.compare(&right).unwrap_or(Ordering::Equal),
        };

        let ordering = match criterion.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Stable sort of items by their row data.
pub fn sort_items(items: &mut [Item], criteria: &[SortCriterion]) {
    if criteria.is_empty() {
        return;
    }
    items.sort_by(|a, b| compare_rows(&a.data, &b.data, criteria));
}
