use crate::{commands::QueryArgs, error::CliError};
use engine_core::view::{NameResolver, RenameMapping};
use model::{
    core::value::Value,
    query::{
        attributes::FetchAttribute,
        filter::{FilterExpr, FilterOp},
        sort::SortCriterion,
    },
};

/// Sort, filter and attribute arguments turned into query types.
#[derive(Debug, Default)]
pub struct Query {
    pub sort: Option<Vec<SortCriterion>>,
    pub filter: Option<FilterExpr>,
}

impl Query {
    pub fn from_args(args: &QueryArgs) -> Result<Self, CliError> {
        let sort = args
            .sort
            .iter()
            .map(|s| s.parse::<SortCriterion>().map_err(CliError::InvalidArgument))
            .collect::<Result<Vec<_>, _>>()?;

        let mut filters = args
            .filter
            .iter()
            .map(|f| parse_filter(f))
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(text) = &args.text {
            filters.push(FilterExpr::text(text));
        }

        let filter = match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => Some(FilterExpr::and(filters)),
        };

        Ok(Self {
            sort: (!sort.is_empty()).then_some(sort),
            filter,
        })
    }
}

/// Parses `attribute:$op[:value]`. The value is read as JSON when possible
/// and as a plain string otherwise.
pub fn parse_filter(raw: &str) -> Result<FilterExpr, CliError> {
    let mut parts = raw.splitn(3, ':');
    let (Some(attribute), Some(op)) = (parts.next(), parts.next()) else {
        return Err(CliError::InvalidArgument(format!(
            "Filter '{raw}' must look like ATTRIBUTE:$OP[:VALUE]"
        )));
    };
    if attribute.is_empty() {
        return Err(CliError::InvalidArgument(format!(
            "Filter '{raw}' has no attribute"
        )));
    }

    let op: FilterOp = op
        .parse()
        .map_err(|e: model::error::ModelError| CliError::InvalidArgument(e.to_string()))?;
    let value = match parts.next() {
        Some(value) => parse_value(value),
        None if op == FilterOp::Present => Value::Null,
        None => {
            return Err(CliError::InvalidArgument(format!(
                "Filter '{raw}' needs a value for {op}"
            )));
        }
    };

    Ok(FilterExpr::attribute(op, attribute, value))
}

pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(raw)
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(raw))
}

/// Parses `source=view` pairs into a rename mapping.
pub fn parse_renames(pairs: &[String]) -> Result<Option<RenameMapping>, CliError> {
    if pairs.is_empty() {
        return Ok(None);
    }

    let pairs = pairs
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((source, view)) if !source.is_empty() && !view.is_empty() => {
                Ok((source.to_string(), view.to_string()))
            }
            _ => Err(CliError::InvalidArgument(format!(
                "Rename '{pair}' must look like SOURCE=VIEW"
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(RenameMapping::new(NameResolver::new(pairs))))
}

pub fn parse_attributes(raw: &[String]) -> Option<Vec<FetchAttribute>> {
    (!raw.is_empty()).then(|| raw.iter().map(|a| FetchAttribute::from(a.as_str())).collect())
}
