use crate::core::{LoadSummary, Pipeline};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<LoadSummary> {
        tracing::info!("Reading inputs...");
        let input = self.pipeline.extract().await?;
        tracing::info!(
            "Read {} rows and a {}-sheet template",
            input.table.len(),
            input.template.sheet_count
        );
        self.monitor.log_stats("Extract");

        tracing::info!("Generating documents...");
        let report = self.pipeline.transform(input).await?;
        tracing::info!(
            "Generated {} document(s), {} failed",
            report.documents.len(),
            report.failures.len()
        );
        self.monitor.log_stats("Transform");

        tracing::info!("Saving documents...");
        let summary = self.pipeline.load(report).await?;
        tracing::info!("Output saved to: {}", summary.output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(summary)
    }
}
