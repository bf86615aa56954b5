mod cmd;
mod engine;
mod export;
mod source;

use clap::{Parser, Subcommand};

/// Estimate import duty for used vehicles from a reference price table.
#[derive(Parser, Debug)]
#[command(name = "dutycalc", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find vehicles by name and show their estimated duty
    Search(cmd::search::SearchCommand),
    /// Full tax breakdown for a single vehicle
    Quote(cmd::quote::QuoteCommand),
    /// Filter the whole table and optionally export a report
    Market(cmd::market::MarketCommand),
    /// Side-by-side specs for several vehicles
    Compare(cmd::compare::CompareCommand),
    /// Show how the source table was read and mapped
    Inspect(cmd::inspect::InspectCommand),
    /// Print the report schema or the column inference rules
    Schema(cmd::schema::SchemaCommand),
    /// Interactive loop reusing one loaded table
    Session(cmd::session::SessionCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Search(search) => search.exec(),
        Command::Quote(quote) => quote.exec(),
        Command::Market(market) => market.exec(),
        Command::Compare(compare) => compare.exec(),
        Command::Inspect(inspect) => inspect.exec(),
        Command::Schema(schema) => schema.exec(),
        Command::Session(session) => session.exec(),
    }
}
