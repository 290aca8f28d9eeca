use crate::{core::value::Value, error::ModelError, records::row::RowData};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt, str::FromStr};

/// Operators of an attribute filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "$eq")]
    Eq,
    #[serde(rename = "$ne")]
    Ne,
    #[serde(rename = "$lt")]
    Lt,
    #[serde(rename = "$le")]
    Le,
    #[serde(rename = "$gt")]
    Gt,
    #[serde(rename = "$ge")]
    Ge,
    #[serde(rename = "$sw")]
    StartsWith,
    #[serde(rename = "$ew")]
    EndsWith,
    #[serde(rename = "$co")]
    Contains,
    #[serde(rename = "$pr")]
    Present,
}

impl FilterOp {
    pub const ALL: [FilterOp; 10] = [
        FilterOp::Eq,
        FilterOp::Ne,
        FilterOp::Lt,
        FilterOp::Le,
        FilterOp::Gt,
        FilterOp::Ge,
        FilterOp::StartsWith,
        FilterOp::EndsWith,
        FilterOp::Contains,
        FilterOp::Present,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "$eq",
            FilterOp::Ne => "$ne",
            FilterOp::Lt => "$lt",
            FilterOp::Le => "$le",
            FilterOp::Gt => "$gt",
            FilterOp::Ge => "$ge",
            FilterOp::StartsWith => "$sw",
            FilterOp::EndsWith => "$ew",
            FilterOp::Contains => "$co",
            FilterOp::Present => "$pr",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOp {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterOp::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModelError::InvalidFilterOperator(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompoundOp {
    #[serde(rename = "$and")]
    And,
    #[serde(rename = "$or")]
    Or,
}

/// A filter criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterExpr {
    Attribute {
        op: FilterOp,
        attribute: String,
        value: Value,
    },
    Compound {
        op: CompoundOp,
        criteria: Vec<FilterExpr>,
    },
    /// Matches rows where any field contains the text, ignoring case.
    Text { text: String },
}

impl FilterExpr {
    pub fn attribute(op: FilterOp, attribute: &str, value: impl Into<Value>) -> Self {
        FilterExpr::Attribute {
            op,
            attribute: attribute.to_string(),
            value: value.into(),
        }
    }

    pub fn and(criteria: Vec<FilterExpr>) -> Self {
        FilterExpr::Compound {
            op: CompoundOp::And,
            criteria,
        }
    }

    pub fn or(criteria: Vec<FilterExpr>) -> Self {
        FilterExpr::Compound {
            op: CompoundOp::Or,
            criteria,
        }
    }

    pub fn text(text: &str) -> Self {
        FilterExpr::Text {
            text: text.to_string(),
        }
    }

    /// Evaluates the criterion against a row.
    pub fn matches(&self, row: &RowData) -> bool {
        match self {
            FilterExpr::Attribute {
                op,
                attribute,
                value,
            } => eval_attribute(*op, &lookup(row, attribute), value),
            FilterExpr::Compound { op, criteria } => match op {
                CompoundOp::And => criteria.iter().all(|c| c.matches(row)),
                CompoundOp::Or => criteria.iter().any(|c| c.matches(row)),
            },
            FilterExpr::Text { text } => {
                let needle = text.to_lowercase();
                row.field_values.iter().any(|f| {
                    f.value
                        .as_string()
                        .is_some_and(|s| s.to_lowercase().contains(&needle))
                })
            }
        }
    }

    /// Rewrites every attribute name through `rename`.
    pub fn rename_attributes(&self, rename: &impl Fn(&str) -> String) -> FilterExpr {
        match self {
            FilterExpr::Attribute {
                op,
                attribute,
                value,
            } => FilterExpr::Attribute {
                op: *op,
                attribute: rename(attribute),
                value: value.clone(),
            },
            FilterExpr::Compound { op, criteria } => FilterExpr::Compound {
                op: *op,
                criteria: criteria
                    .iter()
                    .map(|c| c.rename_attributes(rename))
                    .collect(),
            },
            FilterExpr::Text { text } => FilterExpr::Text { text: text.clone() },
        }
    }

    /// Operators used anywhere in the expression.
    pub fn operators(&self) -> Vec<FilterOp> {
        match self {
            FilterExpr::Attribute { op, .. } => vec![*op],
            FilterExpr::Compound { criteria, .. } => {
                criteria.iter().flat_map(FilterExpr::operators).collect()
            }
            FilterExpr::Text { .. } => Vec::new(),
        }
    }
}

/// Resolves `attribute` on the row, descending into JSON objects for dotted paths.
fn lookup(row: &RowData, attribute: &str) -> Value {
    if let Some(field) = row.get(attribute) {
        return field.value.clone();
    }

    let mut parts = attribute.split('.');
    let Some(head) = parts.next() else {
        return Value::Null;
    };

    let mut current = match row.get_value(head) {
        Value::Json(json) => json,
        _ => return Value::Null,
    };
    for part in parts {
        current = match current.get(part) {
            Some(next) => next.clone(),
            None => return Value::Null,
        };
    }
    Value::from(current)
}

fn eval_attribute(op: FilterOp, actual: &Value, expected: &Value) -> bool {
    match op {
        FilterOp::Present => !actual.is_null(),
        FilterOp::Eq => values_equal(actual, expected),
        FilterOp::Ne => !values_equal(actual, expected),
        FilterOp::Lt => actual.compare(expected) == Some(Ordering::Less),
        FilterOp::Le => matches!(
            actual.compare(expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        FilterOp::Gt => actual.compare(expected) == Some(Ordering::Greater),
        FilterOp::Ge => matches!(
            actual.compare(expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOp::StartsWith => string_op(actual, expected, |a, e| a.starts_with(e)),
        FilterOp::EndsWith => string_op(actual, expected, |a, e| a.ends_with(e)),
        FilterOp::Contains => string_op(actual, expected, |a, e| a.contains(e)),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    a == b || a.compare(b) == Some(Ordering::Equal)
}

fn string_op(actual: &Value, expected: &Value, f: impl Fn(&str, &str) -> bool) -> bool {
    match (actual.as_string(), expected.as_string()) {
        (Some(a), Some(e)) => f(&a, &e),
        _ => false,
    }
}
