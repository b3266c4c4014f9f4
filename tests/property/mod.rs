//! Property-based tests
//!
//! Uses proptest to generate random operation sequences and verify the
//! invariants that must hold after each of them

pub mod registry_proptest;
pub mod validation_proptest;
