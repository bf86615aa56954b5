//! Inspect command - how the source table was read and interpreted

use crate::cmd::DatasetArgs;
use crate::engine::{Canonical, Degradation, MappedColumn, Resolution};
use crate::source::Dataset;
use clap::Args;
use serde::Serialize;
use std::collections::BTreeMap;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct InspectCommand {
    /// Also list every degraded field, not just the totals
    #[arg(short, long)]
    all: bool,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    dataset: DatasetArgs,
}

#[derive(Debug, Serialize)]
struct InspectOutput<'a> {
    source: String,
    size: u64,
    modified: String,
    sha256: &'a str,
    records: usize,
    columns: &'a [MappedColumn],
    degradations: &'a [Degradation],
}

impl InspectCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let dataset = self.dataset.load()?;

        if self.json {
            let output = InspectOutput {
                source: dataset.source().display().to_string(),
                size: dataset.fingerprint.stamp.size,
                modified: dataset.fingerprint.modified_display(),
                sha256: &dataset.fingerprint.sha256,
                records: dataset.table.len(),
                columns: &dataset.table.mapping.columns,
                degradations: &dataset.table.degradations,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        self.print_source(&dataset);
        self.print_columns(&dataset);
        self.print_degradations(&dataset);
        Ok(())
    }

    fn print_source(&self, dataset: &Dataset) {
        let fp = &dataset.fingerprint;
        println!();
        println!("SOURCE");
        println!("  File:      {}", dataset.source().display());
        println!("  Size:      {} bytes", fp.stamp.size);
        println!("  Modified:  {}", fp.modified_display());
        println!("  SHA-256:   {}", fp.sha256);
        println!("  Vehicles:  {}", dataset.table.len());
        println!();
    }

    fn print_columns(&self, dataset: &Dataset) {
        let rows: Vec<ColumnRow> = dataset
            .table
            .mapping
            .columns
            .iter()
            .map(|c| ColumnRow {
                index: c.index,
                label: c.label.clone(),
                canonical: match c.resolution {
                    Resolution::Matched { target } | Resolution::AlreadyCanonical { target } => {
                        target.to_string()
                    }
                    Resolution::Shadowed { target, .. } => format!("({})", target),
                    Resolution::Unmatched => "-".to_string(),
                },
                how: resolution_note(&c.resolution, &dataset.table.mapping.columns),
            })
            .collect();

        println!("COLUMNS");
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::left()))
            .to_string();
        println!("{}", table);

        let missing: Vec<&str> = Canonical::ALL
            .iter()
            .filter(|c| dataset.table.mapping.column_for(**c).is_none())
            .map(|c| c.label())
            .collect();
        if !missing.is_empty() {
            println!("  Not found: {}", missing.join(", "));
        }
        let mapping = &dataset.table.mapping;
        println!(
            "  {} unmapped, {} shadowed",
            mapping.unmatched().count(),
            mapping.shadowed().count()
        );
        println!();
    }

    fn print_degradations(&self, dataset: &Dataset) {
        let degradations = &dataset.table.degradations;
        println!("DEGRADED FIELDS");
        if degradations.is_empty() {
            println!("  (none)");
            return;
        }

        for (field, count) in degradation_counts(degradations) {
            println!("  {:14} {}", field.label(), count);
        }

        if self.all {
            println!();
            for d in degradations {
                println!("  row {:>5}  {:14} {}", d.row, d.field.label(), d.reason);
            }
        }
    }
}

#[derive(Debug, Tabled)]
struct ColumnRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Source Label")]
    label: String,
    #[tabled(rename = "Canonical")]
    canonical: String,
    #[tabled(rename = "Resolution")]
    how: String,
}

fn resolution_note(resolution: &Resolution, columns: &[MappedColumn]) -> String {
    match resolution {
        Resolution::Matched { .. } => "keyword".to_string(),
        Resolution::AlreadyCanonical { .. } => "exact".to_string(),
        Resolution::Shadowed { owner, .. } => {
            let owner_label = columns
                .get(*owner)
                .map(|c| c.label.as_str())
                .unwrap_or("?");
            format!("shadowed by '{}'", owner_label)
        }
        Resolution::Unmatched => "unmapped".to_string(),
    }
}

/// Number of degraded values per field.
pub fn degradation_counts(degradations: &[Degradation]) -> BTreeMap<Canonical, usize> {
    let mut counts = BTreeMap::new();
    for d in degradations {
        *counts.entry(d.field).or_insert(0) += 1;
    }
    counts
}
