use crate::config::toml_config::GeneratorConfig;
use crate::core::composer::DocumentComposer;
use crate::core::grouping::group_institutions;
use crate::core::reader::read_source_table;
use crate::core::{
    ConfigProvider, ExtractedInput, GenerationReport, LoadSummary, Pipeline, Storage,
    TemplateWorkbook,
};
use crate::utils::error::Result;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const BUNDLE_FILENAME: &str = "documentos.zip";

/// Reads the data table and template from `input`, writes one workbook per institution
/// to `output`.
pub struct DocumentPipeline<I: Storage, S: Storage, C: ConfigProvider> {
    input: I,
    output: S,
    config: C,
    generator: GeneratorConfig,
    bundle: bool,
}

impl<I: Storage, S: Storage, C: ConfigProvider> DocumentPipeline<I, S, C> {
    pub fn new(input: I, output: S, config: C, generator: GeneratorConfig) -> Self {
        Self {
            input,
            output,
            config,
            generator,
            bundle: false,
        }
    }

    /// Also write every document into a single zip archive.
    pub fn with_bundle(mut self, bundle: bool) -> Self {
        self.bundle = bundle;
        self
    }

    fn build_bundle(report: &GenerationReport) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for document in &report.documents {
            zip.start_file(document.relative_path(), SimpleFileOptions::default())?;
            zip.write_all(&document.bytes)?;
        }
        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[async_trait::async_trait]
impl<I: Storage, S: Storage, C: ConfigProvider> Pipeline for DocumentPipeline<I, S, C> {
    async fn extract(&self) -> Result<ExtractedInput> {
        tracing::debug!("Reading source table from: {}", self.config.data_path());
        let data = self.input.read_file(self.config.data_path()).await?;
        let table = read_source_table(&data, &self.generator.columns)?;

        tracing::debug!("Reading template from: {}", self.config.template_path());
        let template_bytes = self.input.read_file(self.config.template_path()).await?;
        let template = TemplateWorkbook::from_bytes(template_bytes)?;

        Ok(ExtractedInput { table, template })
    }

    async fn transform(&self, input: ExtractedInput) -> Result<GenerationReport> {
        let groups = group_institutions(
            &input.table,
            self.config.group_by_region(),
            &self.generator.output,
        );
        tracing::info!("Generating {} document(s)", groups.len());

        let composer = DocumentComposer::new(&self.generator, input.table.columns);
        Ok(composer.compose_all(&input.template, &groups))
    }

    async fn load(&self, report: GenerationReport) -> Result<LoadSummary> {
        let mut summary = LoadSummary {
            output_path: self.config.output_path().to_string(),
            written: Vec::with_capacity(report.documents.len()),
            failed: report.failures.clone(),
        };

        for document in &report.documents {
            let path = document.relative_path();
            tracing::debug!("Writing {} ({} bytes)", path, document.bytes.len());
            self.output.write_file(&path, &document.bytes).await?;
            summary.written.push(path);
        }

        if self.bundle && !report.documents.is_empty() {
            let zip_data = Self::build_bundle(&report)?;
            tracing::debug!("Writing {} ({} bytes)", BUNDLE_FILENAME, zip_data.len());
            self.output.write_file(BUNDLE_FILENAME, &zip_data).await?;
        }

        Ok(summary)
    }
}
