#[cfg(feature = "cli")]
pub mod cli;
pub mod lambda;
pub mod storage;
pub mod toml_config;

pub use storage::{LocalStorage, MemoryStorage};
pub use toml_config::GeneratorConfig;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

/// Request-scoped settings used when the caller is not the CLI (service layer, Lambda).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_path: String,
    pub template_path: String,
    pub output_path: String,
    pub group_by_region: bool,
}

impl crate::core::ConfigProvider for RunConfig {
    fn data_path(&self) -> &str {
        &self.data_path
    }

    fn template_path(&self) -> &str {
        &self.template_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn group_by_region(&self) -> bool {
        self.group_by_region
    }
}
