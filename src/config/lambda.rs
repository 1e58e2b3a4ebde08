#[cfg(feature = "lambda")]
use crate::config::toml_config::GeneratorConfig;
#[cfg(feature = "lambda")]
use crate::utils::error::Result;
#[cfg(feature = "lambda")]
use std::env;

/// Lambda settings come from the function's environment.
#[cfg(feature = "lambda")]
#[derive(Debug, Clone)]
pub struct LambdaConfig {
    /// Optional TOML layout bundled with the function (`DOCFILL_CONFIG`).
    pub layout_config_path: Option<String>,
    /// Default for requests that do not say whether to group by region.
    pub group_by_region: bool,
}

#[cfg(feature = "lambda")]
impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        let group_by_region = match env::var("DOCFILL_GROUP_BY_REGION") {
            Ok(value) => parse_flag("DOCFILL_GROUP_BY_REGION", &value)?,
            Err(_) => false,
        };

        Ok(Self {
            layout_config_path: env::var("DOCFILL_CONFIG").ok().filter(|p| !p.is_empty()),
            group_by_region,
        })
    }

    pub fn generator_config(&self) -> Result<GeneratorConfig> {
        match &self.layout_config_path {
            Some(path) => GeneratorConfig::from_file(path),
            None => Ok(GeneratorConfig::default()),
        }
    }
}

#[cfg(feature = "lambda")]
fn parse_flag(field: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(crate::utils::error::EtlError::InvalidConfigValueError {
            field: field.to_string(),
            value: other.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

#[cfg(feature = "lambda")]
impl crate::utils::validation::Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        if let Some(path) = &self.layout_config_path {
            crate::utils::validation::validate_path("DOCFILL_CONFIG", path)?;
        }
        tracing::info!("✅ Lambda configuration validation passed");
        Ok(())
    }
}
