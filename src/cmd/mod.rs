pub mod compare;
pub mod inspect;
pub mod market;
pub mod quote;
pub mod schema;
pub mod search;
pub mod session;

use crate::engine::{
    compute, DutyBreakdown, VehicleRecord, DEFAULT_YEAR, EARLIEST_YEAR, REFERENCE_YEAR,
};
use crate::source::{Dataset, SourceSelection, TableCache, DEFAULT_EXCLUDES};
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use std::rc::Rc;

/// Options shared by every command that needs the price table.
#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// Directory searched for the largest .csv or .xlsx price table
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Use this price table instead of searching --dir
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Additional file names to skip when searching --dir
    #[arg(long)]
    exclude: Vec<String>,

    /// Year of manufacture used for the duty estimate
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_YEAR,
        value_parser = clap::value_parser!(i32).range(EARLIEST_YEAR as i64..=REFERENCE_YEAR as i64)
    )]
    pub year: i32,
}

impl DatasetArgs {
    pub fn selection(&self) -> SourceSelection {
        match &self.file {
            Some(path) => SourceSelection::File(path.clone()),
            None => {
                let mut exclude: Vec<String> =
                    DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
                exclude.extend(self.exclude.iter().cloned());
                SourceSelection::Discover {
                    dir: self.dir.clone(),
                    exclude,
                }
            }
        }
    }

    pub fn load(&self) -> anyhow::Result<Rc<Dataset>> {
        load_with(&mut TableCache::new(), &self.selection())
    }
}

pub fn load_with(
    cache: &mut TableCache,
    selection: &SourceSelection,
) -> anyhow::Result<Rc<Dataset>> {
    let dataset = cache.load(selection).with_context(|| match selection {
        SourceSelection::File(path) => format!("Unable to load price table {}", path.display()),
        SourceSelection::Discover { dir, .. } => format!(
            "Unable to load a price table from {}. Place a .csv or .xlsx file there or pass --file.",
            dir.display()
        ),
    })?;
    if dataset.table.is_empty() {
        log::warn!("{} contains no vehicles", dataset.source().display());
    }
    Ok(dataset)
}

/// Records paired with their breakdown for `year`, cheapest duty first.
pub fn priced<'a, I>(records: I, year: i32) -> Vec<(&'a VehicleRecord, DutyBreakdown)>
where
    I: IntoIterator<Item = &'a VehicleRecord>,
{
    let mut priced: Vec<_> = records
        .into_iter()
        .map(|record| (record, compute(record, year)))
        .collect();
    priced.sort_by(|(_, a), (_, b)| a.total.cmp(&b.total));
    priced
}
