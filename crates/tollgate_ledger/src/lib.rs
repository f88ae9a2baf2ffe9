//! Usage accounting for the Tollgate gateway.
//!
//! [`PricingTable`] turns token counts into dollars and [`UsageLedger`]
//! accumulates what successful calls cost, per day, per model and over the
//! lifetime of the ledger. Failed and denied calls are never recorded.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod ledger;
mod pricing;
mod usage;

pub use ledger::{LedgerSettings, UsageLedger};
pub use pricing::{ModelPrice, PricingTable};
pub use usage::{DailyUsage, LifetimeSummary, ModelUsage};
