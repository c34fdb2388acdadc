//! Core domain types and logic.

pub mod inflation;
pub mod yearly_price;
pub mod market;
pub mod account;
pub mod strategy;
pub mod simulation;
pub mod format;
pub mod config_validation;
pub mod error;
