//! Index Store and Retriever.
//!
//! Typical flow:
//! 1) `build_and_save` walks the document root, chunks, embeds and writes `index.json`
//! 2) `Index::load` reads it back wholesale
//! 3) `Retriever::retrieve` embeds a query and linearly scans every stored vector

pub mod build;
pub mod search;
pub mod store;

pub use build::{build_and_save, build_index, IndexBuilder};
pub use search::{rank, Retriever};
pub use store::{Index, IndexEntry};
