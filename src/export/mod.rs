// src/export/mod.rs

mod csv;
mod xlsx;

pub use csv::to_csv;
pub use xlsx::to_xlsx;

use clap::ValueEnum;

/// Worksheet name used in Excel snapshots.
pub const EXCEL_SHEET_NAME: &str = "RateCons";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}
