//! Session command - interactive loop over one cached table

use crate::cmd::quote::{find, render_quote};
use crate::cmd::search::{search, summary_table, DEFAULT_LIMIT};
use crate::cmd::{load_with, DatasetArgs};
use crate::engine::{compute, EARLIEST_YEAR, REFERENCE_YEAR};
use crate::source::{SourceSelection, TableCache};
use clap::Args;
use std::io::{self, BufRead, Write};

#[derive(Args, Debug)]
pub struct SessionCommand {
    #[command(flatten)]
    dataset: DatasetArgs,
}

impl SessionCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let mut session = Session::new(self.dataset.selection(), self.dataset.year);
        let summary = session.reload()?;
        println!("{}", summary);
        println!("Type 'help' for commands.");

        let stdin = io::stdin();
        let stdout = io::stdout();
        session.run(stdin.lock(), stdout.lock())
    }
}

/// What the loop should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Selected year and cached table shared by every command in the loop.
pub struct Session {
    cache: TableCache,
    selection: SourceSelection,
    year: i32,
}

impl Session {
    pub fn new(selection: SourceSelection, year: i32) -> Self {
        Self {
            cache: TableCache::new(),
            selection,
            year,
        }
    }

    #[cfg(test)]
    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> anyhow::Result<()> {
        write!(out, "{}> ", self.year)?;
        out.flush()?;
        for line in input.lines() {
            let line = line?;
            match self.handle(&line, &mut out) {
                Ok(Flow::Quit) => return Ok(()),
                Ok(Flow::Continue) => {}
                Err(e) => writeln!(out, "error: {:#}", e)?,
            }
            write!(out, "{}> ", self.year)?;
            out.flush()?;
        }
        writeln!(out)?;
        Ok(())
    }

    /// Execute one input line.
    pub fn handle<W: Write>(&mut self, line: &str, out: &mut W) -> anyhow::Result<Flow> {
        let line = line.trim();
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };

        match command.to_lowercase().as_str() {
            "" => {}
            "quit" | "exit" => return Ok(Flow::Quit),
            "help" => {
                writeln!(
                    out,
                    "year N       estimate for year of manufacture N ({}-{})",
                    EARLIEST_YEAR, REFERENCE_YEAR
                )?;
                writeln!(out, "search TEXT  vehicles whose name contains TEXT")?;
                writeln!(out, "quote NAME   full breakdown for NAME")?;
                writeln!(out, "reload       read the source file again")?;
                writeln!(out, "quit         leave the session")?;
            }
            "year" => {
                let year: i32 = arg
                    .parse()
                    .map_err(|_| anyhow::anyhow!("'{}' is not a year", arg))?;
                if !(EARLIEST_YEAR..=REFERENCE_YEAR).contains(&year) {
                    anyhow::bail!(
                        "year must be between {} and {}",
                        EARLIEST_YEAR,
                        REFERENCE_YEAR
                    );
                }
                self.year = year;
                log::debug!("year set to {}", year);
                writeln!(out, "year set to {}", year)?;
            }
            "search" => {
                let dataset = load_with(&mut self.cache, &self.selection)?;
                let found = search(&dataset.table.records, arg, self.year, DEFAULT_LIMIT);
                if found.matches.is_empty() {
                    writeln!(out, "No vehicles found matching '{}'", arg)?;
                } else {
                    writeln!(out, "{}", found.heading())?;
                    writeln!(out, "{}", summary_table(&found.matches))?;
                }
            }
            "quote" => {
                let dataset = load_with(&mut self.cache, &self.selection)?;
                let mut found = false;
                for vehicle in find(&dataset.table.records, arg) {
                    found = true;
                    let duty = compute(vehicle, self.year);
                    writeln!(out, "{}", render_quote(vehicle, &duty, self.year))?;
                }
                if !found {
                    writeln!(out, "No vehicle named '{}'", arg)?;
                }
            }
            "reload" => {
                let summary = self.reload()?;
                writeln!(out, "{}", summary)?;
            }
            other => writeln!(out, "unknown command '{}', try 'help'", other)?,
        }
        Ok(Flow::Continue)
    }

    /// Drop the cached table and read the source again.
    pub fn reload(&mut self) -> anyhow::Result<String> {
        self.cache.invalidate();
        let dataset = load_with(&mut self.cache, &self.selection)?;
        Ok(format!(
            "{} vehicles from {} [{}]",
            dataset.table.len(),
            dataset.source().display(),
            dataset.fingerprint.short_digest()
        ))
    }
}
