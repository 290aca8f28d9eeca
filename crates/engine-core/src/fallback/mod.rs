//! Iteration-based stand-ins for keyed and offset access, and the layered
//! provider that installs them over a provider which can only iterate.

pub mod keys;
pub mod layered;
pub mod offset;

pub use keys::{FetchByKeysIteration, FetchByKeysStrategy};
pub use layered::LayeredDataProvider;
pub use offset::{FetchByOffsetIteration, FetchByOffsetStrategy};

/// True once `fetched` rows reach the optional limit.
pub(crate) fn limit_reached(limit: Option<usize>, fetched: usize) -> bool {
    limit.is_some_and(|limit| fetched >= limit)
}
