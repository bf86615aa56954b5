//! Quote command - full tax breakdown for one vehicle

use crate::cmd::DatasetArgs;
use crate::engine::{compute, DutyBreakdown, VehicleRecord};
use crate::export::format_currency;
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct QuoteCommand {
    /// Search name of the vehicle, e.g. "TOYOTA PRADO" (case-insensitive)
    name: String,

    /// Output as JSON instead of a table
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    dataset: DatasetArgs,
}

#[derive(Debug, Serialize)]
struct Quote<'a> {
    year: i32,
    vehicle: &'a VehicleRecord,
    duty: DutyBreakdown,
}

impl QuoteCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let dataset = self.dataset.load()?;
        let year = self.dataset.year;

        let quotes: Vec<Quote> = find(&dataset.table.records, &self.name)
            .map(|vehicle| Quote {
                year,
                vehicle,
                duty: compute(vehicle, year),
            })
            .collect();

        if quotes.is_empty() {
            anyhow::bail!("No vehicle named '{}'", self.name);
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&quotes)?);
            return Ok(());
        }

        for quote in &quotes {
            print_quote(quote.vehicle, &quote.duty, year);
        }
        Ok(())
    }
}

/// Records whose search name equals `name`, ignoring case and surrounding space.
pub fn find<'a>(
    records: &'a [VehicleRecord],
    name: &str,
) -> impl Iterator<Item = &'a VehicleRecord> {
    let wanted = name.trim().to_uppercase();
    records
        .iter()
        .filter(move |r| r.search_name.to_uppercase() == wanted)
}

pub fn print_quote(vehicle: &VehicleRecord, duty: &DutyBreakdown, year: i32) {
    println!();
    println!("{}", render_quote(vehicle, duty, year));
}

/// Heading lines followed by the component table.
pub fn render_quote(vehicle: &VehicleRecord, duty: &DutyBreakdown, year: i32) -> String {
    let mut out = format!(
        "{} ({}, {} cc, {}) - year {}\n",
        vehicle.search_name, vehicle.category, vehicle.cc, vehicle.fuel, year
    );
    if let Some(bracket) = duty.bracket {
        out.push_str(&format!(
            "Bracket: {}, depreciation {}%\n",
            bracket,
            duty.depreciation_pct.normalize()
        ));
    }

    let table = Table::new(line_items(vehicle, duty))
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    out.push_str(&table);
    out
}

#[derive(Debug, Tabled)]
struct LineItem {
    #[tabled(rename = "Component")]
    component: &'static str,
    #[tabled(rename = "Amount")]
    amount: String,
}

fn line_items(vehicle: &VehicleRecord, duty: &DutyBreakdown) -> Vec<LineItem> {
    let item = |component, amount: Decimal| LineItem {
        component,
        amount: format_currency(amount),
    };
    vec![
        item("CRSP", vehicle.crsp),
        item("Customs Value", duty.customs_value),
        item("Import Duty", duty.import_duty),
        item("Excise Duty", duty.excise_duty),
        item("VAT", duty.vat),
        item("IDF", duty.idf),
        item("RDL", duty.rdl),
        item("Total", duty.total),
    ]
}
