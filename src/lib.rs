pub mod config;
pub mod core;
pub mod domain;
pub mod service;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

#[cfg(feature = "lambda")]
pub use config::lambda::LambdaConfig;

pub use config::{GeneratorConfig, LocalStorage, MemoryStorage, RunConfig};
pub use core::{etl::EtlEngine, pipeline::DocumentPipeline};
pub use utils::error::{EtlError, Result};
