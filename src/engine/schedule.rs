use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::fmt;

/// Year the rate schedule is valid for; vehicle age is measured from it.
pub const REFERENCE_YEAR: i32 = 2025;

/// Oldest selectable year of manufacture.
pub const EARLIEST_YEAR: i32 = REFERENCE_YEAR - 7;

/// Year selected when none is given.
pub const DEFAULT_YEAR: i32 = EARLIEST_YEAR;

pub const VAT_RATE: Decimal = dec!(0.16);
pub const IDF_RATE: Decimal = dec!(0.025);
pub const RDL_RATE: Decimal = dec!(0.02);

/// Depreciation applied to vehicles older than the table covers.
const FLAT_DEPRECIATION: Decimal = dec!(0.70);

const DEPRECIATION_BY_AGE: [Decimal; 9] = [
    dec!(0.05),
    dec!(0.05),
    dec!(0.20),
    dec!(0.30),
    dec!(0.40),
    dec!(0.50),
    dec!(0.55),
    dec!(0.60),
    dec!(0.65),
];

/// Depreciation fraction for a vehicle of the given age in years.
///
/// Ages 0-8 come from the table; anything else, including a negative age,
/// is flat 70%.
pub fn depreciation(age: i32) -> Decimal {
    match usize::try_from(age) {
        Ok(age) => DEPRECIATION_BY_AGE
            .get(age)
            .copied()
            .unwrap_or(FLAT_DEPRECIATION),
        Err(_) => FLAT_DEPRECIATION,
    }
}

/// Fuel/displacement class that decides which rates apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Bracket {
    Electric,
    LargeEngine,
    SmallEngine,
    Standard,
}

/// Rates applied together for one bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rates {
    /// Divisor converting the reference price into customs terms
    pub exchange_adjustment: Decimal,
    pub import_duty: Decimal,
    pub excise: Decimal,
}

impl Bracket {
    /// Pick the bracket for a fuel label and displacement. Fuel matching is
    /// literal substring containment on the canonical (upper-case) label;
    /// unknown fuels such as `PETROL` land in the displacement brackets.
    pub fn select(fuel: &str, cc: u64) -> Bracket {
        if fuel.contains("ELECTRIC") {
            Bracket::Electric
        } else if (cc > 3000 && fuel.contains("GASOLINE")) || (cc > 2500 && fuel.contains("DIESEL"))
        {
            Bracket::LargeEngine
        } else if cc <= 1500 {
            Bracket::SmallEngine
        } else {
            Bracket::Standard
        }
    }

    pub fn rates(&self) -> Rates {
        match self {
            Bracket::Electric => Rates {
                exchange_adjustment: dec!(2.15325),
                import_duty: dec!(0.25),
                excise: dec!(0.10),
            },
            Bracket::LargeEngine => Rates {
                exchange_adjustment: dec!(2.64262),
                import_duty: dec!(0.35),
                excise: dec!(0.35),
            },
            Bracket::SmallEngine => Rates {
                exchange_adjustment: dec!(2.34900),
                import_duty: dec!(0.35),
                excise: dec!(0.20),
            },
            Bracket::Standard => Rates {
                exchange_adjustment: dec!(2.44687),
                import_duty: dec!(0.35),
                excise: dec!(0.25),
            },
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            Bracket::Electric => "Electric",
            Bracket::LargeEngine => "Large engine",
            Bracket::SmallEngine => "Up to 1500cc",
            Bracket::Standard => "Standard",
        }
    }
}

impl fmt::Display for Bracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}
