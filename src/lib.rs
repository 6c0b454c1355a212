//! Symptom Triage - Conversational symptom intake service
//!
//! This crate implements a staged intake conversation that collects a
//! patient's symptoms, short-circuits emergencies, and degrades from a
//! primary model to a cheaper model to a local rule-based reply.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
