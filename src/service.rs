//! Transport-free request boundary: validates the two uploads, runs the pipeline and
//! shapes the JSON response (documents as base64, or written to a directory).

use crate::config::{GeneratorConfig, LocalStorage, MemoryStorage, RunConfig};
use crate::core::etl::EtlEngine;
use crate::core::pipeline::DocumentPipeline;
use crate::core::{LoadSummary, Storage};
use crate::domain::model::DocumentFailure;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{has_allowed_extension, validate_path, ALLOWED_EXTENSIONS};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

const DATA_KEY: &str = "archivo";
const TEMPLATE_KEY: &str = "plantilla";

#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub archivo: Option<Upload>,
    pub plantilla: Option<Upload>,
    pub carpeta_salida: Option<String>,
    pub organizar_por_region: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub filename: String,
    /// Base64 workbook bytes; empty when the file was written to `carpeta_salida`.
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub message: String,
    pub documents: Vec<GeneratedFile>,
    pub failed: Vec<DocumentFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceError {
    pub error: String,
    #[serde(skip)]
    pub status: u16,
}

impl From<EtlError> for ServiceError {
    fn from(e: EtlError) -> Self {
        Self {
            error: e.user_friendly_message(),
            status: e.status_code(),
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (status {})", self.error, self.status)
    }
}

impl std::error::Error for ServiceError {}

/// Both uploads present, named, and spreadsheets.
pub fn validate_uploads(request: &GenerateRequest) -> Result<(&Upload, &Upload)> {
    let (archivo, plantilla) = match (&request.archivo, &request.plantilla) {
        (Some(archivo), Some(plantilla)) => (archivo, plantilla),
        _ => return Err(EtlError::validation("No se enviaron archivos")),
    };

    if archivo.filename.is_empty() || plantilla.filename.is_empty() {
        return Err(EtlError::validation("No se seleccionaron archivos"));
    }

    if !(has_allowed_extension(&archivo.filename, ALLOWED_EXTENSIONS)
        && has_allowed_extension(&plantilla.filename, ALLOWED_EXTENSIONS))
    {
        return Err(EtlError::validation("Formato de archivo no válido"));
    }

    Ok((archivo, plantilla))
}

async fn run_pipeline<S: Storage>(
    input: MemoryStorage,
    output: S,
    config: RunConfig,
    generator: &GeneratorConfig,
) -> Result<LoadSummary> {
    let pipeline = DocumentPipeline::new(input, output, config, generator.clone());
    EtlEngine::new(pipeline).run().await
}

pub async fn generate(
    request: GenerateRequest,
    generator: &GeneratorConfig,
) -> std::result::Result<GenerateResponse, ServiceError> {
    let (archivo, plantilla) = validate_uploads(&request)?;
    if let Some(dir) = &request.carpeta_salida {
        validate_path("carpeta_salida", dir)?;
    }

    let input = MemoryStorage::with_files([
        (DATA_KEY.to_string(), archivo.bytes.clone()),
        (TEMPLATE_KEY.to_string(), plantilla.bytes.clone()),
    ]);
    let config = RunConfig {
        data_path: DATA_KEY.to_string(),
        template_path: TEMPLATE_KEY.to_string(),
        output_path: request.carpeta_salida.clone().unwrap_or_default(),
        group_by_region: request.organizar_por_region,
    };

    let (summary, documents) = match &request.carpeta_salida {
        Some(dir) => {
            let summary =
                run_pipeline(input, LocalStorage::new(dir.clone()), config, generator).await?;
            let documents = summary
                .written
                .iter()
                .map(|filename| GeneratedFile {
                    filename: filename.clone(),
                    content: String::new(),
                })
                .collect();
            (summary, documents)
        }
        None => {
            let output = MemoryStorage::new();
            let summary = run_pipeline(input, output.clone(), config, generator).await?;
            let documents = output
                .take_files()
                .await
                .into_iter()
                .map(|(filename, bytes)| GeneratedFile {
                    filename,
                    content: STANDARD.encode(bytes),
                })
                .collect();
            (summary, documents)
        }
    };

    let mut message = if request.organizar_por_region {
        "Documentos generados por región".to_string()
    } else {
        "Documentos generados".to_string()
    };
    if !summary.failed.is_empty() {
        let institutions: Vec<&str> = summary
            .failed
            .iter()
            .map(|failure| failure.institution.as_str())
            .collect();
        message.push_str(&format!(
            " ({} institución(es) con error: {})",
            institutions.len(),
            institutions.join(", ")
        ));
    }

    Ok(GenerateResponse {
        success: true,
        message,
        documents,
        failed: summary.failed,
    })
}
