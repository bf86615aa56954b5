//! Compare command - side-by-side specs for several vehicles

use crate::cmd::quote::find;
use crate::cmd::{priced, DatasetArgs};
use crate::engine::{compute, VehicleRecord};
use crate::export::format_currency;
use clap::Args;
use std::collections::{BTreeSet, HashMap};
use tabled::{
    builder::Builder,
    settings::{object::Columns, Alignment, Modify, Style},
};

#[derive(Args, Debug)]
pub struct CompareCommand {
    /// Search names of the vehicles to compare
    #[arg(required = true)]
    names: Vec<String>,

    #[command(flatten)]
    dataset: DatasetArgs,
}

impl CompareCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let dataset = self.dataset.load()?;

        let selected = select(&dataset.table.records, &self.names, self.dataset.year);
        if selected.is_empty() {
            anyhow::bail!("None of the requested vehicles were found");
        }

        let matrix = spec_matrix(&selected, self.dataset.year);
        let mut builder = Builder::default();
        for row in matrix {
            builder.push_record(row);
        }
        let table = builder
            .build()
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        Ok(())
    }
}

/// Every record named at least once, each taken once, cheapest duty first.
pub fn select<'a>(
    records: &'a [VehicleRecord],
    names: &[String],
    year: i32,
) -> Vec<&'a VehicleRecord> {
    let mut rows = BTreeSet::new();
    for name in names {
        let before = rows.len();
        let mut found = false;
        for vehicle in find(records, name) {
            found = true;
            rows.insert(vehicle.row);
        }
        if !found {
            log::warn!("no vehicle named '{}'", name);
        } else if rows.len() == before {
            log::debug!("'{}' already selected", name);
        }
    }

    let chosen = records.iter().filter(|r| rows.contains(&r.row));
    priced(chosen, year)
        .into_iter()
        .map(|(vehicle, _)| vehicle)
        .collect()
}

/// Column headers for the selection; names occurring more than once carry
/// their source row.
pub fn display_names(vehicles: &[&VehicleRecord]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in vehicles {
        *counts.entry(v.search_name.as_str()).or_default() += 1;
    }
    vehicles
        .iter()
        .map(|v| {
            if counts.get(v.search_name.as_str()).copied().unwrap_or(0) > 1 {
                format!("{} ({})", v.search_name, v.row)
            } else {
                v.search_name.clone()
            }
        })
        .collect()
}

/// Header row followed by one row per attribute.
pub fn spec_matrix(vehicles: &[&VehicleRecord], year: i32) -> Vec<Vec<String>> {
    let mut header = vec!["Spec".to_string()];
    header.extend(display_names(vehicles));

    vec![
        header,
        attribute(vehicles, "Category", |v| v.category.clone()),
        attribute(vehicles, "CC", |v| v.cc.to_string()),
        attribute(vehicles, "Fuel", |v| v.fuel.clone()),
        attribute(vehicles, "Transmission", |v| v.transmission.clone()),
        attribute(vehicles, "Drive", |v| v.drive.clone()),
        attribute(vehicles, "Seating", |v| v.seating.clone()),
        attribute(vehicles, "CRSP", |v| format_currency(v.crsp)),
        attribute(vehicles, "Estimated Duty", |v| {
            format_currency(compute(v, year).total)
        }),
    ]
}

fn attribute<F>(vehicles: &[&VehicleRecord], label: &str, value: F) -> Vec<String>
where
    F: Fn(&VehicleRecord) -> String,
{
    let mut row = vec![label.to_string()];
    row.extend(vehicles.iter().map(|v| value(*v)));
    row
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
            drive: "4WD".to_string(),
            category: "SUV".to_string(),
            seating: "7".to_string(),
            crsp,
            model_code: None,
        }
    }

    #[test]
    fn duplicate_names_are_disambiguated_by_row() {
        let a = record(3, "TOYOTA PRADO", 2700, "GASOLINE", dec!(6500000));
        let b = record(9, "TOYOTA PRADO", 2800, "DIESEL", dec!(7000000));
        let c = record(4, "BMW X5", 2993, "DIESEL", dec!(9000000));

        assert_eq!(
            display_names(&[&a, &b, &c]),
            vec!["TOYOTA PRADO (3)", "TOYOTA PRADO (9)", "BMW X5"]
        );
    }

    #[test]
    fn repeated_names_are_selected_once_in_duty_order() {
        let records = vec![
            record(0, "TOYOTA PRADO", 2700, "GASOLINE", dec!(6500000)),
            record(1, "MAZDA DEMIO", 1300, "GASOLINE", dec!(1800000)),
            record(2, "BMW X5", 2993, "DIESEL", dec!(9000000)),
        ];
        let names: Vec<String> = ["toyota prado", "TOYOTA PRADO", "mazda demio", "lada niva"]
            .iter()
            .map(|n| n.to_string())
            .collect();

        let selected = select(&records, &names, 2018);
        let matrix = spec_matrix(&selected, 2018);
        assert_eq!(matrix[0], vec!["Spec", "MAZDA DEMIO", "TOYOTA PRADO"]);
    }

    #[test]
    fn same_name_rows_are_kept_apart() {
        let records = vec![
            record(3, "TOYOTA PRADO", 2800, "DIESEL", dec!(9000000)),
            record(9, "TOYOTA PRADO", 2700, "GASOLINE", dec!(6500000)),
        ];
        let selected = select(&records, &["toyota prado".to_string()], 2018);
        assert_eq!(
            display_names(&selected),
            vec!["TOYOTA PRADO (9)", "TOYOTA PRADO (3)"]
        );
    }

    #[test]
    fn matrix_has_a_column_per_vehicle() {
        let prado = record(0, "TOYOTA PRADO", 2700, "GASOLINE", dec!(6500000));
        let x5 = record(1, "BMW X5", 2993, "DIESEL", dec!(9000000));
        let matrix = spec_matrix(&[&prado, &x5], 2018);

        assert_eq!(matrix[0], vec!["Spec", "TOYOTA PRADO", "BMW X5"]);
        assert!(matrix.iter().all(|row| row.len() == 3));

        let duty = matrix.last().unwrap();
        assert_eq!(duty[0], "Estimated Duty");
        assert_eq!(duty[1], "KES 1,065,238");
        assert_eq!(duty[2], "KES 1,579,024");
    }
}
