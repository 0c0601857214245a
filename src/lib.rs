//! Core of the imports/exports dashboard: loading, filtering and the
//! aggregations behind every chart. The egui front end lives in the
//! `trade-dashboard` binary and only consumes what this crate produces.

pub mod config;
pub mod data;
pub mod error;
pub mod state;
