use std::io;

use rocket_dyn_templates::handlebars::RenderError;
use thiserror::Error;

/// Everything that can stop a label batch from being produced.
///
/// The display text is what ends up in front of the user, so it reads as a
/// sentence rather than a debug dump.
#[derive(Debug, Error)]
pub enum LabelError {
    #[error("Error reading Excel file: {0}")]
    Workbook(#[from] calamine::XlsxError),
    #[error("Error writing Excel file: {0}")]
    WorkbookWrite(#[from] xlsxwriter::XlsxError),
    #[error("Error reading Excel file: workbook has no worksheets")]
    NoWorksheet,
    #[error("Please upload an Excel file (.xlsx)")]
    NoUpload,
    #[error("Could not find required column '{0}'")]
    MissingColumn(String),
    #[error("Bottle ID '{0}' is not a whole number")]
    NotNumeric(String),
    #[error("Error generating labels: {0}")]
    Template(#[from] RenderError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, LabelError>;
