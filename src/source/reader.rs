use super::{SourceError, SourceKind};
use crate::engine::{RawCell, RawTable};
use calamine::{Data, Reader, Xlsx};
use std::io::{Cursor, Read, Seek};

/// Parse file contents already loaded into memory.
pub fn read_table(kind: SourceKind, bytes: Vec<u8>) -> Result<RawTable, SourceError> {
    let table = match kind {
        SourceKind::Csv => read_csv(bytes.as_slice())?,
        SourceKind::Xlsx => read_xlsx(Cursor::new(bytes))?,
    };
    log::info!(
        "read {} rows x {} columns",
        table.len(),
        table.headers.len()
    );
    Ok(table)
}

/// First row is the header; rows may be ragged.
pub fn read_csv<R: Read>(reader: R) -> Result<RawTable, SourceError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.iter().map(str::to_string).collect();
    let mut table = RawTable::new(headers);
    for record in rdr.records() {
        let record = record?;
        table.push_row(record.iter().map(RawCell::from_text).collect());
    }
    Ok(table)
}

/// Reads the first worksheet; its first row is the header.
pub fn read_xlsx<RS: Read + Seek>(reader: RS) -> Result<RawTable, SourceError> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(reader).map_err(|e| SourceError::Excel(e.to_string()))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(SourceError::EmptyWorkbook)?;
    log::debug!("reading worksheet '{}'", sheet);

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| SourceError::Excel(e.to_string()))?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => header_row.iter().map(|c| c.to_string()).collect(),
        None => Vec::new(),
    };

    let mut table = RawTable::new(headers);
    for row in rows {
        table.push_row(row.iter().map(to_raw_cell).collect());
    }
    Ok(table)
}

fn to_raw_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty | Data::Error(_) => RawCell::Empty,
        Data::String(s) => RawCell::from_text(s),
        Data::Float(f) => RawCell::Number(*f),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Bool(b) => RawCell::Bool(*b),
        other => RawCell::from_text(&other.to_string()),
    }
}
