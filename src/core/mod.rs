//! Core business logic abstractions

pub mod adjustment;
pub mod cache;
pub mod config;
pub mod error;
pub mod locale;
pub mod log;
pub mod resolver;
pub mod sample;
pub mod series;
pub mod service;
pub mod source;

// Re-export main types for cleaner imports
pub use adjustment::AdjustmentResult;
pub use error::IndexError;
pub use resolver::LookBack;
pub use series::{IndexPoint, IndexSeries, SeriesOrigin};
pub use service::AdjustmentService;
pub use source::IndexSource;
