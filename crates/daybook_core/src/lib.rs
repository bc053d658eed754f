//! Core types for the Daybook daily agent: configuration, the structured
//! report data model, date stamping, and the file-backed blob store.

pub mod config;
pub mod dates;
pub mod report;
pub mod store;

pub use config::DaybookConfig;
pub use report::{AbRatio, MemorySection, OpsSection, PostSection, StructuredReport};
pub use store::FileStore;
