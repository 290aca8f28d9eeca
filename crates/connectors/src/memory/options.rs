use model::{capability::IterateAfterDone, fetch::list::DEFAULT_PAGE_SIZE};

#[derive(Debug, Clone)]
pub struct ArrayProviderOptions {
    /// Field holding the row key. Without one, rows are keyed by insertion
    /// sequence number.
    pub key_attribute: Option<String>,

    /// Page size of `fetch_first` when the caller does not pass one.
    pub page_size: usize,

    pub iterate_after_done: IterateAfterDone,
}

impl Default for ArrayProviderOptions {
    fn default() -> Self {
        ArrayProviderOptions {
            key_attribute: None,
            page_size: DEFAULT_PAGE_SIZE,
            iterate_after_done: IterateAfterDone::Allowed,
        }
    }
}

impl ArrayProviderOptions {
    pub fn keyed_by(attribute: &str) -> Self {
        ArrayProviderOptions {
            key_attribute: Some(attribute.to_string()),
            ..Default::default()
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}
