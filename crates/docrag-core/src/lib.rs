//! Core of the docrag pipeline: domain types, errors, configuration,
//! provider capability traits, document loading and chunking.

pub mod chunker;
pub mod config;
pub mod error;
pub mod loader;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
