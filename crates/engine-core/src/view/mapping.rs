use model::{
    query::{attributes::FetchAttribute, filter::FilterExpr, sort::SortCriterion},
    records::item::Item,
};
use std::collections::HashMap;

/// Translation between the vocabulary of a wrapped provider ("source") and
/// the vocabulary a view exposes ("view").
///
/// `map_*` goes view -> source for criteria and source -> view for rows;
/// `unmap_*` is the inverse for criteria. Every method defaults to identity.
pub trait DataMapping: Send + Sync {
    /// Turns a source row into the row the view exposes.
    fn map_fields(&self, item: Item) -> Item {
        item
    }

    fn map_sort_criteria(&self, criteria: &[SortCriterion]) -> Vec<SortCriterion> {
        criteria.to_vec()
    }

    fn unmap_sort_criteria(&self, criteria: &[SortCriterion]) -> Vec<SortCriterion> {
        criteria.to_vec()
    }

    fn map_filter_criterion(&self, filter: &FilterExpr) -> FilterExpr {
        filter.clone()
    }

    fn unmap_filter_criterion(&self, filter: &FilterExpr) -> FilterExpr {
        filter.clone()
    }

    fn map_attributes(&self, attributes: &[FetchAttribute]) -> Vec<FetchAttribute> {
        attributes.to_vec()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMapping;

impl DataMapping for IdentityMapping {}

/// Bidirectional case-insensitive name mapping. Lookups ignore case; the
/// returned names keep the case they were registered with.
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    source_to_view: HashMap<String, String>,
    view_to_source: HashMap<String, String>,
}

impl NameResolver {
    pub fn new<I, S, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<String>,
        V: Into<String>,
    {
        let mut resolver = Self::default();
        for (source, view) in pairs {
            let (source, view) = (source.into(), view.into());
            resolver
                .source_to_view
                .insert(source.to_ascii_lowercase(), view.clone());
            resolver
                .view_to_source
                .insert(view.to_ascii_lowercase(), source);
        }
        resolver
    }

    /// Source name -> view name. Unknown names pass through.
    pub fn resolve(&self, name: &str) -> String {
        self.source_to_view
            .get(&name.to_ascii_lowercase())
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    /// View name -> source name. Unknown names pass through.
    pub fn reverse_resolve(&self, name: &str) -> String {
        self.view_to_source
            .get(&name.to_ascii_lowercase())
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.source_to_view.is_empty()
    }
}

/// A [`DataMapping`] that only renames fields.
#[derive(Debug, Clone, Default)]
pub struct RenameMapping {
    names: NameResolver,
}

impl RenameMapping {
    pub fn new(names: NameResolver) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &NameResolver {
        &self.names
    }

    fn to_source(&self) -> impl Fn(&str) -> String + '_ {
        |name| self.names.reverse_resolve(name)
    }

    fn to_view(&self) -> impl Fn(&str) -> String + '_ {
        |name| self.names.resolve(name)
    }
}

impl DataMapping for RenameMapping {
    fn map_fields(&self, item: Item) -> Item {
        Item {
            metadata: item.metadata,
            data: item.data.rename_fields(self.to_view()),
        }
    }

    fn map_sort_criteria(&self, criteria: &[SortCriterion]) -> Vec<SortCriterion> {
        rename_sort(criteria, &self.to_source())
    }

    fn unmap_sort_criteria(&self, criteria: &[SortCriterion]) -> Vec<SortCriterion> {
        rename_sort(criteria, &self.to_view())
    }

    fn map_filter_criterion(&self, filter: &FilterExpr) -> FilterExpr {
        filter.rename_attributes(&self.to_source())
    }

    fn unmap_filter_criterion(&self, filter: &FilterExpr) -> FilterExpr {
        filter.rename_attributes(&self.to_view())
    }

    fn map_attributes(&self, attributes: &[FetchAttribute]) -> Vec<FetchAttribute> {
        let to_source = self.to_source();
        attributes.iter().map(|a| a.renamed(&to_source)).collect()
    }
}

fn rename_sort(criteria: &[SortCriterion], rename: &impl Fn(&str) -> String) -> Vec<SortCriterion> {
    criteria
        .iter()
        .map(|c| SortCriterion {
            attribute: rename(&c.attribute),
            direction: c.direction,
        })
        .collect()
}
