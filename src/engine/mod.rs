pub mod coerce;
pub mod columns;
pub mod duty;
pub mod normalize;
pub mod record;
pub mod schedule;

// Flat public surface for domain types and functions.
pub use columns::{Canonical, MappedColumn, Resolution, RULES};
pub use duty::{compute, DutyBreakdown};
pub use normalize::{normalize, Degradation, VehicleTable};
pub use record::{RawCell, RawTable, VehicleRecord};
pub use schedule::{DEFAULT_YEAR, EARLIEST_YEAR, REFERENCE_YEAR};
