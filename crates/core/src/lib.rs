//! Core business logic for Caja.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain calculations for cash-session reconciliation live here.
//!
//! # Modules
//!
//! - `cash` - Cash line pricing, balance summaries, tolerance and rounding rules

pub mod cash;
