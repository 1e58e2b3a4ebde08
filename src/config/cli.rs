use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extensions, validate_path, Validate, ALLOWED_EXTENSIONS,
};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "docfill-etl")]
#[command(about = "Fill the institution template once per institution in a data table")]
pub struct CliConfig {
    /// Source table (.xlsx/.xls) with one row per student
    #[arg(long)]
    pub data: String,

    /// Template workbook (.xlsx)
    #[arg(long)]
    pub template: String,

    #[arg(long, default_value = "./output")]
    pub output: String,

    /// Put each region's documents in its own sub-directory
    #[arg(long)]
    pub by_region: bool,

    /// Optional TOML file overriding the template layout
    #[arg(long)]
    pub config: Option<String>,

    /// Also bundle every generated document into documentos.zip
    #[arg(long)]
    pub zip: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU/memory usage per phase")]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn data_path(&self) -> &str {
        &self.data
    }

    fn template_path(&self) -> &str {
        &self.template
    }

    fn output_path(&self) -> &str {
        &self.output
    }

    fn group_by_region(&self) -> bool {
        self.by_region
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("data", &self.data)?;
        validate_path("template", &self.template)?;
        validate_path("output", &self.output)?;
        validate_file_extensions(
            "data/template",
            &[self.data.as_str(), self.template.as_str()],
            ALLOWED_EXTENSIONS,
        )?;
        if let Some(config) = &self.config {
            validate_path("config", config)?;
        }
        Ok(())
    }
}
