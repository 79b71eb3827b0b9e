//! Quality gate services used at startup.
//!
//! - [`ConditionsUpdater`]: validates and creates gate conditions
//! - [`QualityGates`]: reads and writes the default gate
//! - [`Rating`]: the A..E rating scale used by rating metrics

mod conditions;
mod gates;
mod rating;

pub use conditions::{ConditionsUpdater, allowed_operators};
pub use gates::{DEFAULT_GATE_PROPERTY, QualityGates};
pub use rating::Rating;
