pub mod amortization;
pub mod analysis;
pub mod assumptions;
pub mod error;
pub mod labels;
pub mod metrics;
pub mod preparation;
pub mod rent_model;
pub mod screening;
pub mod table;
pub mod types;

pub use assumptions::AssumptionSet;
pub use error::RentalRoiError;
pub use types::*;

/// Standard result type for all rental-roi operations
pub type RentalRoiResult<T> = Result<T, RentalRoiError>;
