//! Report and export payloads

use serde::Serialize;
use utoipa::ToSchema;

/// Labeled value of a visit report
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReportField {
    pub label: String,
    pub value: String,
}

/// Printable visit report data
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VisitReport {
    /// Campaign title used as the report heading
    pub title: String,
    pub visit_id: i32,
    /// Suggested file name for the rendered document
    pub file_name: String,
    pub fields: Vec<ReportField>,
    /// Notes are only shown to organizers
    pub notes: Option<String>,
    pub attending: Vec<String>,
    pub not_attending: Vec<String>,
}

/// Tabular export, one string cell per column
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExportTable {
    /// Suggested file name for the spreadsheet
    pub file_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}
