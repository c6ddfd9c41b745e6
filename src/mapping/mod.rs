pub mod bank;
pub mod profile;
pub mod rules;
pub mod table;

pub use bank::BankResolver;
pub use profile::{AxisRange, ControlMap, DeviceProfile};
pub use rules::{RangeMapper, RangeRule};
pub use table::CodeTable;
