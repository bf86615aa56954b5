//! Schema command - report format and column inference rules

use crate::engine::{Canonical, RULES};
use crate::export::ExportRow;
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema or columns
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for a market report row
    JsonSchema,
    /// How source column labels are mapped to canonical fields
    Columns,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => self.print_json_schema(),
            SchemaFormat::Columns => self.print_columns(),
        }
    }

    fn print_json_schema(&self) -> anyhow::Result<()> {
        let schema = schema_for!(ExportRow);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }

    fn print_columns(&self) -> anyhow::Result<()> {
        println!("Column Inference");
        println!("================");
        println!();
        println!("A label equal to a canonical name (any case) maps to it directly:");
        let names: Vec<&str> = Canonical::ALL.iter().map(|c| c.label()).collect();
        println!("  {}", names.join(", "));
        println!();
        println!("Otherwise the first rule whose keywords all occur in the label wins:");
        for rule in RULES {
            let note = if rule.exclusive { "  (first column only)" } else { "" };
            println!(
                "  {:28} -> {}{}",
                rule.keywords.join(" + "),
                rule.target,
                note
            );
        }
        println!();
        println!("A target already held by an earlier column is never reassigned.");
        Ok(())
    }
}
