//! Mock forensic analysis engine for Bitcoin and Ethereum transactions.
//!
//! Generates synthetic transactions, scores them with weighted heuristic
//! rules, and synthesizes forensic reports for user-supplied hashes.

pub mod alerts;
pub mod analysis;
pub mod config;
pub mod context;
pub mod core;
pub mod error;
pub mod explorer;
pub mod session;
pub mod signals;
pub mod tags;
pub mod ui;
