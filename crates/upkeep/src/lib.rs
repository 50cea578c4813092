//! Condition scoring and maintenance scheduling for property maintenance planning.
//!
//! The [`workflows::maintenance`] module holds the planning core: defect registries kept in
//! sync with inspection reports, the aggregate condition score, and the expansion of a
//! scheduling intent into task groups and offer groups. Everything else in the crate is the
//! ambient plumbing callers need around it.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
