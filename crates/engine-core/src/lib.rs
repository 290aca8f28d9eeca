pub mod fallback;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;
