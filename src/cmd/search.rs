//! Search command - duty estimates for vehicles matching a name

use crate::cmd::{priced, DatasetArgs};
use crate::engine::{DutyBreakdown, VehicleRecord};
use crate::export::{format_amount, ExportRow};
use clap::Args;
use serde::Serialize;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

pub const DEFAULT_LIMIT: usize = 60;

#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Text to look for in make and model (case-insensitive); empty lists everything
    #[arg(default_value = "")]
    query: String,

    /// Maximum number of results
    #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
    limit: usize,

    /// Show every component of the duty instead of the summary columns
    #[arg(short, long)]
    breakdown: bool,

    /// Output as JSON instead of a table
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    dataset: DatasetArgs,
}

/// A matched vehicle with its estimate, as emitted by `--json`.
#[derive(Debug, Serialize)]
pub struct Match<'a> {
    pub vehicle: &'a VehicleRecord,
    pub duty: DutyBreakdown,
}

impl SearchCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let dataset = self.dataset.load()?;
        let records = &dataset.table.records;
        let found = search(records, &self.query, self.dataset.year, self.limit);
        log::debug!("{} matches for '{}'", found.total, self.query);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&found.matches)?);
        } else if found.matches.is_empty() {
            println!("No vehicles found matching '{}'", self.query);
        } else {
            println!("{}", found.heading());
            if self.breakdown {
                print_breakdown(&found.matches);
            } else {
                print_summary(&found.matches);
            }
        }
        Ok(())
    }
}

/// Search results cut to the limit, with the number of records that matched.
#[derive(Debug)]
pub struct Found<'a> {
    pub total: usize,
    pub matches: Vec<Match<'a>>,
}

impl Found<'_> {
    /// `Found N vehicles`, noting when the limit hid some of them.
    pub fn heading(&self) -> String {
        let noun = if self.total == 1 { "vehicle" } else { "vehicles" };
        if self.matches.len() < self.total {
            format!(
                "Found {} {}, showing the first {}",
                self.total,
                noun,
                self.matches.len()
            )
        } else {
            format!("Found {} {}", self.total, noun)
        }
    }
}

/// Case-insensitive substring match on the search name, cheapest first.
pub fn search<'a>(
    records: &'a [VehicleRecord],
    query: &str,
    year: i32,
    limit: usize,
) -> Found<'a> {
    let needle = query.trim().to_uppercase();
    let hits = records
        .iter()
        .filter(|r| r.search_name.to_uppercase().contains(&needle));

    let priced = priced(hits, year);
    let total = priced.len();
    let matches = priced
        .into_iter()
        .take(limit)
        .map(|(vehicle, duty)| Match { vehicle, duty })
        .collect();
    Found { total, matches }
}

pub fn print_summary(matches: &[Match]) {
    println!("{}", summary_table(matches));
}

pub fn print_breakdown(matches: &[Match]) {
    let rows: Vec<BreakdownRow> = matches.iter().map(BreakdownRow::from).collect();
    println!("{}", render(rows));
}

/// Export columns for each match.
pub fn summary_table(matches: &[Match]) -> String {
    let rows: Vec<ExportRow> = matches
        .iter()
        .map(|m| ExportRow::new(m.vehicle, &m.duty))
        .collect();
    render(rows)
}

fn render<T: Tabled>(rows: Vec<T>) -> String {
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string()
}

#[derive(Debug, Tabled)]
struct BreakdownRow {
    #[tabled(rename = "Vehicle")]
    name: String,
    #[tabled(rename = "Bracket")]
    bracket: String,
    #[tabled(rename = "Depreciation")]
    depreciation: String,
    #[tabled(rename = "Customs Value")]
    customs_value: String,
    #[tabled(rename = "Import Duty")]
    import_duty: String,
    #[tabled(rename = "Excise")]
    excise_duty: String,
    #[tabled(rename = "VAT")]
    vat: String,
    #[tabled(rename = "IDF")]
    idf: String,
    #[tabled(rename = "RDL")]
    rdl: String,
    #[tabled(rename = "Total")]
    total: String,
}

impl From<&Match<'_>> for BreakdownRow {
    fn from(m: &Match<'_>) -> Self {
        let d = &m.duty;
        Self {
            name: m.vehicle.search_name.clone(),
            bracket: d.bracket.map_or("-".to_string(), |b| b.to_string()),
            depreciation: format!("{}%", d.depreciation_pct.normalize()),
            customs_value: format_amount(d.customs_value),
            import_duty: format_amount(d.import_duty),
            excise_duty: format_amount(d.excise_duty),
            vat: format_amount(d.vat),
            idf: format_amount(d.idf),
            rdl: format_amount(d.rdl),
            total: format_amount(d.total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn record(row: usize, name: &str, cc: u64, fuel: &str, crsp: Decimal) -> VehicleRecord {
        VehicleRecord {
            row,
            make: String::new(),
            model: String::new(),
            search_name: name.to_string(),
            cc,
            fuel: fuel.to_string(),
            transmission: "AT".to_string(),
            drive: "2WD".to_string(),
            category: "SUV".to_string(),
            seating: "5".to_string(),
            crsp,
            model_code: None,
        }
    }

    fn fleet() -> Vec<VehicleRecord> {
        vec![
            record(0, "TOYOTA PRADO", 2700, "GASOLINE", dec!(6500000)),
            record(1, "TOYOTA LAND CRUISER", 4461, "DIESEL", dec!(11000000)),
            record(2, "MAZDA DEMIO", 1300, "GASOLINE", dec!(1800000)),
        ]
    }

    #[test]
    fn query_is_case_insensitive_substring() {
        let records = fleet();
        let hits = search(&records, "toyota", 2018, DEFAULT_LIMIT).matches;
        let names: Vec<_> = hits.iter().map(|m| m.vehicle.search_name.as_str()).collect();
        assert_eq!(names, vec!["TOYOTA PRADO", "TOYOTA LAND CRUISER"]);
    }

    #[test]
    fn empty_query_lists_everything_up_to_limit() {
        let records = fleet();
        assert_eq!(search(&records, "", 2018, DEFAULT_LIMIT).matches.len(), 3);
        let found = search(&records, "  ", 2018, 2);
        assert_eq!(found.total, 3);
        assert_eq!(found.matches.len(), 2);
        assert_eq!(found.matches[0].vehicle.search_name, "MAZDA DEMIO");
    }

    #[test]
    fn heading_reports_matches_hidden_by_limit() {
        let records = fleet();
        assert_eq!(
            search(&records, "", 2018, 1).heading(),
            "Found 3 vehicles, showing the first 1"
        );
        assert_eq!(search(&records, "toyota", 2018, 60).heading(), "Found 2 vehicles");
        assert_eq!(search(&records, "demio", 2018, 60).heading(), "Found 1 vehicle");
    }

    #[test]
    fn regex_characters_are_literal() {
        let records = fleet();
        let found = search(&records, "TOYOTA.*", 2018, DEFAULT_LIMIT);
        assert!(found.matches.is_empty());
        assert_eq!(found.total, 0);
    }

    #[test]
    fn breakdown_row_formats_amounts() {
        let records = fleet();
        let hits = search(&records, "prado", 2018, 1).matches;
        let row = BreakdownRow::from(&hits[0]);
        assert_eq!(row.bracket, "Standard");
        assert_eq!(row.depreciation, "60%");
        assert_eq!(row.total, "1,065,238");
    }
}
