pub mod engine;
pub mod india;

pub use engine::{compute_tax, SetOff, TaxError, TaxResult};
pub use india::{FiscalYear, RegimeRate, TaxRates};
