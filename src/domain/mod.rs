//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `triage` - Emergency detection, information extraction, stage
//!   classification, context assembly and the local fallback reply

pub mod triage;
