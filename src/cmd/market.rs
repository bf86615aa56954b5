//! Market command - filter the whole table and export the result

use crate::cmd::{priced, DatasetArgs};
use crate::engine::VehicleRecord;
use crate::export::{write_report, ExportRow, DEFAULT_REPORT};
use clap::Args;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table,
};

#[derive(Args, Debug)]
pub struct MarketCommand {
    /// Drive configuration, e.g. 4WD (repeat or comma-separate for several)
    #[arg(long, value_delimiter = ',')]
    drive: Vec<String>,

    /// Fuel type, e.g. DIESEL
    #[arg(long, value_delimiter = ',')]
    fuel: Vec<String>,

    /// Transmission, e.g. AT
    #[arg(long, value_delimiter = ',')]
    transmission: Vec<String>,

    /// Engine displacement in cc
    #[arg(long, value_delimiter = ',')]
    cc: Vec<String>,

    /// Seating capacity
    #[arg(long, value_delimiter = ',')]
    seating: Vec<String>,

    /// Body type
    #[arg(long, value_delimiter = ',')]
    body: Vec<String>,

    /// List the distinct values available for each filter and exit
    #[arg(long)]
    facets: bool,

    /// Write the filtered report to this .xlsx or .csv file
    #[arg(short, long, num_args = 0..=1, default_missing_value = DEFAULT_REPORT)]
    output: Option<PathBuf>,

    /// Open the written report with the default application
    #[arg(long, requires = "output")]
    open: bool,

    #[command(flatten)]
    dataset: DatasetArgs,
}

/// Fields the market view can be filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Drive,
    Fuel,
    Transmission,
    Cc,
    Seating,
    Body,
}

impl Facet {
    pub const ALL: [Facet; 6] = [
        Facet::Drive,
        Facet::Fuel,
        Facet::Transmission,
        Facet::Cc,
        Facet::Seating,
        Facet::Body,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Facet::Drive => "drive",
            Facet::Fuel => "fuel",
            Facet::Transmission => "transmission",
            Facet::Cc => "cc",
            Facet::Seating => "seating",
            Facet::Body => "body",
        }
    }

    pub fn value(&self, record: &VehicleRecord) -> String {
        match self {
            Facet::Drive => record.drive.clone(),
            Facet::Fuel => record.fuel.clone(),
            Facet::Transmission => record.transmission.clone(),
            Facet::Cc => record.cc.to_string(),
            Facet::Seating => record.seating.clone(),
            Facet::Body => record.category.clone(),
        }
    }
}

/// Selected values per facet; an empty list leaves that facet unfiltered.
#[derive(Debug, Default, Clone)]
pub struct MarketFilter {
    pub selected: Vec<(Facet, Vec<String>)>,
}

impl MarketFilter {
    pub fn matches(&self, record: &VehicleRecord) -> bool {
        self.selected.iter().all(|(facet, wanted)| {
            if wanted.is_empty() {
                return true;
            }
            let value = facet.value(record);
            wanted.iter().any(|w| w.trim().eq_ignore_ascii_case(&value))
        })
    }
}

impl MarketCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let dataset = self.dataset.load()?;
        let records = &dataset.table.records;

        if self.facets {
            print_facets(records);
            return Ok(());
        }

        let filter = self.filter();
        let matching = records.iter().filter(|r| filter.matches(r));
        let rows: Vec<ExportRow> = priced(matching, self.dataset.year)
            .into_iter()
            .map(|(record, duty)| ExportRow::new(record, &duty))
            .collect();
        log::info!("{} of {} vehicles match", rows.len(), records.len());

        if rows.is_empty() {
            println!("No vehicles found matching filters");
        } else {
            let table = Table::new(&rows)
                .with(Style::rounded())
                .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
                .to_string();
            println!("{}", table);
        }

        if let Some(ref path) = self.output {
            write_report(path, &rows)?;
            println!("Report written to: {}", path.display());
            if self.open {
                opener::open(path)?;
            }
        }
        Ok(())
    }

    fn filter(&self) -> MarketFilter {
        MarketFilter {
            selected: vec![
                (Facet::Drive, self.drive.clone()),
                (Facet::Fuel, self.fuel.clone()),
                (Facet::Transmission, self.transmission.clone()),
                (Facet::Cc, self.cc.clone()),
                (Facet::Seating, self.seating.clone()),
                (Facet::Body, self.body.clone()),
            ],
        }
    }
}

fn print_facets(records: &[VehicleRecord]) {
    for facet in Facet::ALL {
        println!("{}: {}", facet.name(), facet_values(records, facet).join(", "));
    }
}

/// Distinct values of `facet`, numbers in numeric order ahead of text.
pub fn facet_values(records: &[VehicleRecord], facet: Facet) -> Vec<String> {
    let distinct: BTreeSet<String> = records.iter().map(|r| facet.value(r)).collect();
    let mut values: Vec<String> = distinct.into_iter().collect();
    values.sort_by(|a, b| numeric_aware(a, b));
    values
}

fn numeric_aware(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
