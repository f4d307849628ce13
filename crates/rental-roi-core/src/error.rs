use thiserror::Error;

#[derive(Debug, Error)]
pub enum RentalRoiError {
    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("No common period: home values cover {home_periods} months, rents cover {rent_periods} months, none shared")]
    NoCommonPeriod {
        home_periods: usize,
        rent_periods: usize,
    },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for RentalRoiError {
    fn from(e: serde_json::Error) -> Self {
        RentalRoiError::SerializationError(e.to_string())
    }
}

#[cfg(feature = "ingest")]
impl From<csv::Error> for RentalRoiError {
    fn from(e: csv::Error) -> Self {
        RentalRoiError::MissingData(e.to_string())
    }
}
