pub(crate) mod benchmarks_model;
pub(crate) mod benchmarks_service;

// Re-export the public interface
pub use benchmarks_model::{BenchmarkKind, BenchmarkPoint};
pub use benchmarks_service::BenchmarkService;
