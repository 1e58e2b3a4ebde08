use crate::domain::model::{DocumentFailure, GenerationReport, SourceTable, TemplateWorkbook};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn data_path(&self) -> &str;
    fn template_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn group_by_region(&self) -> bool;
}

/// Inputs handed from extract to transform.
pub struct ExtractedInput {
    pub table: SourceTable,
    pub template: TemplateWorkbook,
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ExtractedInput>;
    async fn transform(&self, input: ExtractedInput) -> Result<GenerationReport>;
    async fn load(&self, report: GenerationReport) -> Result<LoadSummary>;
}

#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    pub output_path: String,
    pub written: Vec<String>,
    pub failed: Vec<DocumentFailure>,
}
