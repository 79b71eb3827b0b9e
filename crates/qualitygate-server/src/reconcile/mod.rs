//! Startup reconciliation of built-in records.
//!
//! Brings stored data in line with definitions compiled into the server:
//! - the built-in quality gate and its conditions

mod quality_gates;

pub use quality_gates::{
    A_RATING, BUILTIN_QUALITY_GATE, BuiltInCondition, GateCondition, LEAK_PERIOD,
    QUALITY_GATE_CONDITIONS, RegisterQualityGates, RegisterReport,
};
