pub(crate) mod prices_errors;
pub(crate) mod prices_model;
pub(crate) mod prices_service;
pub(crate) mod prices_traits;

// Re-export the public interface
pub use prices_model::{NewPricePoint, PriceImportSummary, PricePoint};
pub use prices_service::PriceService;
pub use prices_traits::{PriceRepositoryTrait, PriceServiceTrait};

// Re-export error types for convenience
pub use prices_errors::{PriceError, Result};
