pub mod cispr;
pub mod limits;

pub use cispr::{CisprBand, TimeConstants, WeightingRow, WeightingTable};
pub use limits::{LimitBand, LimitTable, LimitTables, RegulatoryLimits};
