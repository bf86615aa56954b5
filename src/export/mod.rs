//! Report rows and their serialization.

pub mod xlsx;

use crate::engine::{DutyBreakdown, VehicleRecord};
use rust_decimal::{Decimal, RoundingStrategy};
use schemars::JsonSchema;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;
use tabled::Tabled;
use thiserror::Error;
use xlsx::SheetCell;

/// Prefix for every rendered amount; only one currency is modelled.
pub const CURRENCY: &str = "KES";

pub const DEFAULT_REPORT: &str = "market_report.xlsx";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("unsupported report format '{0}' (expected .xlsx or .csv)")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

/// One row of the market report.
#[derive(Debug, Clone, PartialEq, Eq, Tabled, Serialize, JsonSchema)]
pub struct ExportRow {
    /// Make and model, upper-cased
    #[tabled(rename = "Search_Name")]
    #[serde(rename = "Search_Name")]
    pub search_name: String,

    /// Body type
    #[tabled(rename = "Category")]
    #[serde(rename = "Category")]
    pub category: String,

    /// Engine displacement in cc
    #[tabled(rename = "CC")]
    #[serde(rename = "CC")]
    pub cc: u64,

    #[tabled(rename = "Fuel")]
    #[serde(rename = "Fuel")]
    pub fuel: String,

    #[tabled(rename = "Drive")]
    #[serde(rename = "Drive")]
    pub drive: String,

    #[tabled(rename = "Transmission")]
    #[serde(rename = "Transmission")]
    pub transmission: String,

    #[tabled(rename = "Seating")]
    #[serde(rename = "Seating")]
    pub seating: String,

    /// Total duty, e.g. "KES 245,824"
    #[tabled(rename = "Estimated Duty")]
    #[serde(rename = "Estimated Duty")]
    pub estimated_duty: String,
}

impl ExportRow {
    pub const HEADERS: [&'static str; 8] = [
        "Search_Name",
        "Category",
        "CC",
        "Fuel",
        "Drive",
        "Transmission",
        "Seating",
        "Estimated Duty",
    ];

    pub fn new(record: &VehicleRecord, duty: &DutyBreakdown) -> Self {
        Self {
            search_name: record.search_name.clone(),
            category: record.category.clone(),
            cc: record.cc,
            fuel: record.fuel.clone(),
            drive: record.drive.clone(),
            transmission: record.transmission.clone(),
            seating: record.seating.clone(),
            estimated_duty: format_currency(duty.total),
        }
    }

    fn sheet_cells(&self) -> Vec<SheetCell> {
        vec![
            SheetCell::Text(self.search_name.clone()),
            SheetCell::Text(self.category.clone()),
            SheetCell::Number(self.cc as f64),
            SheetCell::Text(self.fuel.clone()),
            SheetCell::Text(self.drive.clone()),
            SheetCell::Text(self.transmission.clone()),
            SheetCell::Text(self.seating.clone()),
            SheetCell::Text(self.estimated_duty.clone()),
        ]
    }
}

/// Whole units with thousands separators, rounding half to even.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

pub fn format_currency(amount: Decimal) -> String {
    format!("{} {}", CURRENCY, format_amount(amount))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Xlsx,
}

impl ReportFormat {
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "xlsx" => Ok(ReportFormat::Xlsx),
            _ => Err(ExportError::UnsupportedFormat(ext)),
        }
    }
}

/// Write the report to `path`, choosing the format from its extension.
pub fn write_report(path: &Path, rows: &[ExportRow]) -> Result<(), ExportError> {
    let format = ReportFormat::from_path(path)?;
    match format {
        ReportFormat::Csv => write_csv(rows, BufWriter::new(File::create(path)?))?,
        ReportFormat::Xlsx => {
            let bytes = to_xlsx(rows)?;
            std::fs::write(path, bytes)?;
        }
    }
    log::info!("wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn write_csv<W: Write>(rows: &[ExportRow], writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Serialize rows into an in-memory XLSX document.
pub fn to_xlsx(rows: &[ExportRow]) -> Result<Vec<u8>, ExportError> {
    let mut sheet = Vec::with_capacity(rows.len() + 1);
    sheet.push(
        ExportRow::HEADERS
            .iter()
            .map(|h| SheetCell::Text(h.to_string()))
            .collect(),
    );
    sheet.extend(rows.iter().map(ExportRow::sheet_cells));

    let cursor = xlsx::write_workbook(Cursor::new(Vec::new()), "Market Report", &sheet)?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RawCell;
    use crate::source::reader::read_xlsx;
    use rust_decimal_macros::dec;

    fn row(name: &str, duty: Decimal) -> ExportRow {
        ExportRow {
            search_name: name.to_string(),
            category: "SUV".to_string(),
            cc: 2700,
            fuel: "GASOLINE".to_string(),
            drive: "4WD".to_string(),
            transmission: "AT".to_string(),
            seating: "7".to_string(),
            estimated_duty: format_currency(duty),
        }
    }

    #[test]
    fn amounts_get_thousands_separators() {
        assert_eq!(format_amount(dec!(0)), "0");
        assert_eq!(format_amount(dec!(999)), "999");
        assert_eq!(format_amount(dec!(1000)), "1,000");
        assert_eq!(format_amount(dec!(245824.2571)), "245,824");
        assert_eq!(format_amount(dec!(1929918.5)), "1,929,918");
        assert_eq!(format_amount(dec!(1929919.5)), "1,929,920");
        assert_eq!(format_amount(dec!(-1234567)), "-1,234,567");
    }

    #[test]
    fn currency_prefix() {
        assert_eq!(format_currency(dec!(85823.93)), "KES 85,824");
    }

    #[test]
    fn csv_report_has_export_columns() {
        let mut out = Vec::new();
        write_csv(&[row("TOYOTA PRADO", dec!(1065238.44))], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(ExportRow::HEADERS.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("TOYOTA PRADO,SUV,2700,GASOLINE,4WD,AT,7,\"KES 1,065,238\"")
        );
    }

    #[test]
    fn xlsx_report_has_header_row() {
        let bytes = to_xlsx(&[row("TOYOTA PRADO", dec!(1000))]).unwrap();
        let table = read_xlsx(Cursor::new(bytes)).unwrap();

        assert_eq!(table.headers, ExportRow::HEADERS.to_vec());
        assert_eq!(table.cell(0, 2), &RawCell::Number(2700.0));
        assert_eq!(table.cell(0, 7), &RawCell::Text("KES 1,000".to_string()));
    }

    #[test]
    fn unknown_report_extension_is_rejected() {
        assert!(matches!(
            ReportFormat::from_path(Path::new("report.pdf")),
            Err(ExportError::UnsupportedFormat(_))
        ));
    }
}
