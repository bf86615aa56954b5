//! Duty cascade for a single vehicle and year of manufacture.

use super::record::VehicleRecord;
use super::schedule::{depreciation, Bracket, IDF_RATE, RDL_RATE, REFERENCE_YEAR, VAT_RATE};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DutyError {
    #[error("year of manufacture {0} is out of range")]
    YearOutOfRange(i32),
    #[error("arithmetic overflow computing {0}")]
    Overflow(&'static str),
}

/// Every component of the estimate. A zeroed breakdown (the `Default`) is
/// what callers get when the calculation could not be carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DutyBreakdown {
    pub customs_value: Decimal,
    pub import_duty: Decimal,
    pub excise_duty: Decimal,
    pub vat: Decimal,
    pub idf: Decimal,
    pub rdl: Decimal,
    pub total: Decimal,
    pub depreciation_pct: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bracket: Option<Bracket>,
}

/// Estimate duty, falling back to a zeroed breakdown on any internal fault.
pub fn compute(record: &VehicleRecord, target_year: i32) -> DutyBreakdown {
    match try_compute(record, target_year) {
        Ok(breakdown) => breakdown,
        Err(e) => {
            log::warn!(
                "row {} ({}): duty not computed: {}",
                record.row,
                record.search_name,
                e
            );
            DutyBreakdown::default()
        }
    }
}

/// Estimate duty, reporting why if the cascade cannot be evaluated.
pub fn try_compute(record: &VehicleRecord, target_year: i32) -> Result<DutyBreakdown, DutyError> {
    let age = REFERENCE_YEAR
        .checked_sub(target_year)
        .ok_or(DutyError::YearOutOfRange(target_year))?;
    let depreciation = depreciation(age);

    let bracket = Bracket::select(&record.fuel, record.cc);
    let rates = bracket.rates();

    let customs_value = record
        .crsp
        .checked_div(rates.exchange_adjustment)
        .and_then(|v| v.checked_mul(Decimal::ONE - depreciation))
        .ok_or(DutyError::Overflow("customs value"))?;

    let import_duty = customs_value
        .checked_mul(rates.import_duty)
        .ok_or(DutyError::Overflow("import duty"))?;

    let excise_duty = customs_value
        .checked_add(import_duty)
        .and_then(|v| v.checked_mul(rates.excise))
        .ok_or(DutyError::Overflow("excise duty"))?;

    let vat = customs_value
        .checked_add(import_duty)
        .and_then(|v| v.checked_add(excise_duty))
        .and_then(|v| v.checked_mul(VAT_RATE))
        .ok_or(DutyError::Overflow("VAT"))?;

    // levies are charged on customs value alone
    let idf = customs_value
        .checked_mul(IDF_RATE)
        .ok_or(DutyError::Overflow("IDF"))?;
    let rdl = customs_value
        .checked_mul(RDL_RATE)
        .ok_or(DutyError::Overflow("RDL"))?;

    let total = [excise_duty, vat, idf, rdl]
        .into_iter()
        .try_fold(import_duty, |acc, v| acc.checked_add(v))
        .ok_or(DutyError::Overflow("total"))?;

    Ok(DutyBreakdown {
        customs_value,
        import_duty,
        excise_duty,
        vat,
        idf,
        rdl,
        total,
        depreciation_pct: depreciation * dec!(100),
        bracket: Some(bracket),
    })
}
