//! quizline-store: content stores and result sinks.
//!
//! Implements the `ContentStore` and `ResultSink` traits over an in-memory
//! catalog, a directory of TOML question banks with JSON results, and a
//! remote REST document store.

pub mod config;
pub mod directory;
pub mod error;
pub mod http;
pub mod memory;

pub use config::{create_backends, load_config, Backends, QuizlineConfig, StoreConfig};
pub use error::StoreError;
