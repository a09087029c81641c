//! Deciding which detected persons are wearing a high-visibility vest.
pub mod containment;
pub mod matcher;

pub use containment::containment_ratio;
pub use matcher::{ComplianceMatcher, ComplianceResult};
