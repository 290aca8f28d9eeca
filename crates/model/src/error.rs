use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    /// A filter operator string did not name a known operator.
    #[error("Invalid filter operator: {0}")]
    InvalidFilterOperator(String),

    /// A mutation event violates the event contract.
    #[error("Invalid mutation: {0}")]
    InvalidMutation(String),
}
