/// Validation failures raised before any projection month is computed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectionError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(
        "down payment must be at least 25% of the house price to get a mortgage (got {:.2}%)",
        .ratio * 100.0
    )]
    DownPaymentTooLow { ratio: f64 },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TaxError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("invalid profile: {0}")]
    InvalidInput(String),
}
