#[cfg(feature = "lambda")]
use base64::{engine::general_purpose::STANDARD, Engine as _};
#[cfg(feature = "lambda")]
use docfill_etl::config::lambda::LambdaConfig;
#[cfg(feature = "lambda")]
use docfill_etl::config::GeneratorConfig;
#[cfg(feature = "lambda")]
use docfill_etl::service::{self, GenerateRequest, GenerateResponse, ServiceError, Upload};
#[cfg(feature = "lambda")]
use docfill_etl::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "lambda")]
#[derive(Deserialize)]
pub struct EncodedUpload {
    pub filename: String,
    /// Base64 file contents.
    pub content: String,
}

#[cfg(feature = "lambda")]
#[derive(Deserialize)]
pub struct Request {
    pub archivo: Option<EncodedUpload>,
    pub plantilla: Option<EncodedUpload>,
    pub organizar_por_region: Option<bool>,
}

#[cfg(feature = "lambda")]
#[derive(Serialize)]
#[serde(untagged)]
pub enum Response {
    Ok(GenerateResponse),
    Err { error: String, status: u16 },
}

#[cfg(feature = "lambda")]
fn decode(upload: Option<EncodedUpload>) -> Result<Option<Upload>, ServiceError> {
    upload
        .map(|upload| -> Result<Upload, ServiceError> {
            let bytes = STANDARD.decode(upload.content.as_bytes()).map_err(|e| ServiceError {
                error: format!("Contenido base64 inválido en {}: {}", upload.filename, e),
                status: 400,
            })?;
            Ok(Upload {
                filename: upload.filename,
                bytes,
            })
        })
        .transpose()
}

#[cfg(feature = "lambda")]
async fn generate(
    payload: Request,
    organizar_por_region: bool,
    generator: &GeneratorConfig,
) -> Result<GenerateResponse, ServiceError> {
    let request = GenerateRequest {
        archivo: decode(payload.archivo)?,
        plantilla: decode(payload.plantilla)?,
        carpeta_salida: None,
        organizar_por_region,
    };
    service::generate(request, generator).await
}

#[cfg(feature = "lambda")]
async fn function_handler(event: LambdaEvent<Request>) -> Result<Response, Error> {
    tracing::info!("Starting document generation");

    let lambda_config = LambdaConfig::from_env()?;
    lambda_config.validate()?;
    let generator = lambda_config.generator_config()?;

    let payload = event.payload;
    let organizar_por_region = payload
        .organizar_por_region
        .unwrap_or(lambda_config.group_by_region);

    Ok(match generate(payload, organizar_por_region, &generator).await {
        Ok(response) => {
            tracing::info!("Generated {} document(s)", response.documents.len());
            Response::Ok(response)
        }
        Err(e) => {
            tracing::error!("❌ Document generation failed: {}", e);
            Response::Err {
                error: e.error,
                status: e.status,
            }
        }
    })
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    run(service_fn(function_handler)).await
}
