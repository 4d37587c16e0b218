//! # Quill Core
//!
//! The domain layer of the Quill blog API.
//! Post validation, the ownership guard and the post resource service live
//! here, with no infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod policy;
pub mod ports;
pub mod service;
pub mod validation;

pub use error::DomainError;
pub use service::PostService;
