use crate::{core::value::Value, query::attributes::FetchAttribute};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldValue {
    pub name: String,
    pub value: Value,
}

/// Row payload as an ordered list of named fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RowData {
    pub field_values: Vec<FieldValue>,
}

impl RowData {
    pub fn new(field_values: Vec<FieldValue>) -> Self {
        RowData { field_values }
    }

    /// Builds a row from `(name, value)` pairs.
    pub fn from_pairs<I, N, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<Value>,
    {
        RowData {
            field_values: pairs
                .into_iter()
                .map(|(name, value)| FieldValue {
                    name: name.into(),
                    value: value.into(),
                })
                .collect(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.field_values
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(field))
    }

    pub fn get_value(&self, field: &str) -> Value {
        self.get(field)
            .map(|f| f.value.clone())
            .unwrap_or(Value::Null)
    }

    /// Sets `field`, replacing an existing value or appending a new field.
    pub fn set(&mut self, field: &str, value: Value) {
        match self
            .field_values
            .iter_mut()
            .find(|f| f.name.eq_ignore_ascii_case(field))
        {
            Some(existing) => existing.value = value,
            None => self.field_values.push(FieldValue {
                name: field.to_string(),
                value,
            }),
        }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.field_values.iter().map(|f| f.name.as_str())
    }

    /// Renames every field through `rename`, keeping values and order.
    pub fn rename_fields(self, rename: impl Fn(&str) -> String) -> Self {
        RowData {
            field_values: self
                .field_values
                .into_iter()
                .map(|f| FieldValue {
                    name: rename(&f.name),
                    value: f.value,
                })
                .collect(),
        }
    }

    /// Restricts the row to the requested attributes.
    ///
    /// `@default` keeps every field, a leading `!` excludes a field, and a nested
    /// attribute projects the JSON object stored under its name.
    pub fn project(&self, attributes: &[FetchAttribute]) -> RowData {
        if attributes.is_empty() {
            return self.clone();
        }

        let include_all = attributes.iter().any(|a| a.is_default())
            || attributes.iter().all(|a| a.is_exclusion());

        let mut fields = Vec::new();
        for field in &self.field_values {
            if attributes.iter().any(|a| a.excludes(&field.name)) {
                continue;
            }

            let requested = attributes
                .iter()
                .find(|a| !a.is_exclusion() && a.name().eq_ignore_ascii_case(&field.name));

            match requested {
                Some(FetchAttribute::Nested { attributes, .. }) => fields.push(FieldValue {
                    name: field.name.clone(),
                    value: project_nested(&field.value, attributes),
                }),
                Some(_) => fields.push(field.clone()),
                None if include_all => fields.push(field.clone()),
                None => {}
            }
        }

        RowData {
            field_values: fields,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .field_values
            .iter()
            .map(|f| (f.name.clone(), f.value.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

impl From<serde_json::Value> for RowData {
    /// Objects become one field per property; any other JSON value is stored
    /// under a single `value` field.
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Object(map) => RowData {
                field_values: map
                    .into_iter()
                    .map(|(name, value)| FieldValue {
                        name,
                        value: Value::from(value),
                    })
                    .collect(),
            },
            other => RowData::from_pairs([("value", Value::from(other))]),
        }
    }
}

fn project_nested(value: &Value, attributes: &[FetchAttribute]) -> Value {
    match value {
        Value::Json(json @ serde_json::Value::Object(_)) => {
            let row = RowData::from(json.clone()).project(attributes);
            Value::Json(row.to_json())
        }
        other => other.clone(),
    }
}
