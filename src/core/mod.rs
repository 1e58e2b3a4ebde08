pub mod composer;
pub mod etl;
pub mod excel_date;
pub mod grouping;
pub mod pipeline;
pub mod reader;
pub mod sheet;
pub mod template;
pub mod text;

pub use crate::domain::model::{
    CareerGroup, GenerationReport, InstitutionGroup, OutputDocument, SourceRow, SourceTable,
    TemplateWorkbook,
};
pub use crate::domain::ports::{ConfigProvider, ExtractedInput, LoadSummary, Pipeline, Storage};
pub use crate::utils::error::Result;
