//! Raw table -> canonical vehicle records.

use super::coerce::{self, DegradeReason};
use super::columns::{normalize_header, Canonical, ColumnMapping};
use super::record::{RawTable, VehicleRecord, SENTINEL};
use rust_decimal::Decimal;
use serde::Serialize;

/// A field that was replaced with its documented default.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Degradation {
    pub row: usize,
    pub field: Canonical,
    pub reason: DegradeReason,
}

/// Canonical records plus the diagnostics gathered while building them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleTable {
    pub records: Vec<VehicleRecord>,
    pub mapping: ColumnMapping,
    pub degradations: Vec<Degradation>,
}

impl VehicleTable {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Resolve column identities and coerce every row of `raw`.
///
/// Never fails: absent columns become sentinels or zeros, and unreadable
/// values are recorded in [`VehicleTable::degradations`].
pub fn normalize(raw: &RawTable) -> VehicleTable {
    let headers: Vec<String> = raw.headers.iter().map(|h| normalize_header(h)).collect();
    let mapping = ColumnMapping::infer(&headers);

    let cc_column = mapping.column_for(Canonical::Cc);
    let crsp_column = mapping.column_for(Canonical::Crsp);
    let model_code_column = mapping.column_for(Canonical::ModelCode);

    if raw.is_empty() {
        log::warn!("source table has no data rows");
    }
    if crsp_column.is_none() {
        log::warn!("no price column found; every reference price defaults to 0");
    }
    if cc_column.is_none() {
        log::warn!("no capacity column found; every displacement defaults to 0");
    }

    let mut degradations = Vec::new();
    let mut records = Vec::with_capacity(raw.len());

    for row in 0..raw.len() {
        let categorical = |field: Canonical| -> String {
            mapping
                .column_for(field)
                .map(|column| coerce::categorical(raw.cell(row, column)))
                .unwrap_or_else(|| SENTINEL.to_string())
        };

        let crsp = match crsp_column {
            Some(column) => {
                let (value, reason) = coerce::price(raw.cell(row, column)).into_parts();
                if let Some(reason) = reason {
                    degradations.push(Degradation {
                        row,
                        field: Canonical::Crsp,
                        reason,
                    });
                }
                value
            }
            None => {
                degradations.push(Degradation {
                    row,
                    field: Canonical::Crsp,
                    reason: DegradeReason::ColumnAbsent,
                });
                Decimal::ZERO
            }
        };

        let cc = match cc_column {
            Some(column) => {
                let (value, reason) = coerce::displacement(raw.cell(row, column)).into_parts();
                if let Some(reason) = reason {
                    degradations.push(Degradation {
                        row,
                        field: Canonical::Cc,
                        reason,
                    });
                }
                value
            }
            None => 0,
        };

        let model_code = model_code_column
            .map(|column| raw.cell(row, column))
            .filter(|cell| !cell.is_blank())
            .map(|cell| cell.to_string().trim().to_string());

        let make = categorical(Canonical::Make);
        let model = categorical(Canonical::Model);
        records.push(VehicleRecord {
            row,
            search_name: format!("{} {}", make, model),
            make,
            model,
            cc,
            fuel: categorical(Canonical::Fuel),
            transmission: categorical(Canonical::Transmission),
            drive: categorical(Canonical::Drive),
            category: categorical(Canonical::Category),
            seating: categorical(Canonical::Seating),
            crsp,
            model_code,
        });
    }

    if !degradations.is_empty() {
        log::info!(
            "{} field(s) across {} row(s) fell back to defaults",
            degradations.len(),
            count_rows(&degradations)
        );
    }

    VehicleTable {
        records,
        mapping,
        degradations,
    }
}

fn count_rows(degradations: &[Degradation]) -> usize {
    let mut rows: Vec<usize> = degradations.iter().map(|d| d.row).collect();
    rows.dedup();
    rows.len()
}
