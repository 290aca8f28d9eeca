use serde::{Deserialize, Serialize};

const DEFAULT_ATTRIBUTES: &str = "@default";

/// An attribute requested by a fetch.
///
/// A plain name selects a field, `!name` excludes it and `@default` stands for
/// every field of the row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FetchAttribute {
    Name(String),
    Nested {
        name: String,
        attributes: Vec<FetchAttribute>,
    },
}

impl FetchAttribute {
    pub fn name(&self) -> &str {
        match self {
            FetchAttribute::Name(name) => name,
            FetchAttribute::Nested { name, .. } => name,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, FetchAttribute::Name(name) if name == DEFAULT_ATTRIBUTES)
    }

    pub fn is_exclusion(&self) -> bool {
        matches!(self, FetchAttribute::Name(name) if name.starts_with('!'))
    }

    /// True when this attribute is `!field`.
    pub fn excludes(&self, field: &str) -> bool {
        match self {
            FetchAttribute::Name(name) => name
                .strip_prefix('!')
                .is_some_and(|n| n.eq_ignore_ascii_case(field)),
            FetchAttribute::Nested { .. } => false,
        }
    }

    /// Renames the attribute (and, for exclusions, the excluded field).
    pub fn renamed(&self, rename: &impl Fn(&str) -> String) -> FetchAttribute {
        match self {
            FetchAttribute::Name(name) if self.is_default() => FetchAttribute::Name(name.clone()),
            FetchAttribute::Name(name) => match name.strip_prefix('!') {
                Some(excluded) => FetchAttribute::Name(format!("!{}", rename(excluded))),
                None => FetchAttribute::Name(rename(name)),
            },
            FetchAttribute::Nested { name, attributes } => FetchAttribute::Nested {
                name: rename(name),
                attributes: attributes.clone(),
            },
        }
    }
}

impl From<&str> for FetchAttribute {
    fn from(name: &str) -> Self {
        FetchAttribute::Name(name.to_string())
    }
}

impl From<String> for FetchAttribute {
    fn from(name: String) -> Self {
        FetchAttribute::Name(name)
    }
}

/// Caller attributes win over the configured default.
pub fn merge_attributes(
    requested: Option<&Vec<FetchAttribute>>,
    default: Option<&Vec<FetchAttribute>>,
) -> Option<Vec<FetchAttribute>> {
    requested.or(default).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusion_detection() {
        let attr = FetchAttribute::from("!Salary");
        assert!(attr.is_exclusion());
        assert!(attr.excludes("salary"));
        assert!(!FetchAttribute::from("salary").excludes("salary"));
    }

    #[test]
    fn test_renamed_keeps_exclusion_prefix() {
        let upper = |s: &str| s.to_ascii_uppercase();
        assert_eq!(
            FetchAttribute::from("!salary").renamed(&upper),
            FetchAttribute::from("!SALARY")
        );
        assert_eq!(
            FetchAttribute::from("@default").renamed(&upper),
            FetchAttribute::from("@default")
        );
    }

    #[test]
    fn test_merge_prefers_requested() {
        let requested = vec![FetchAttribute::from("a")];
        let default = vec![FetchAttribute::from("b")];
        assert_eq!(
            merge_attributes(Some(&requested), Some(&default)),
            Some(requested.clone())
        );
        assert_eq!(merge_attributes(None, Some(&default)), Some(default));
        assert_eq!(merge_attributes(None, None), None);
    }
}
