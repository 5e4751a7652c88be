#![doc = include_str!("../README.md")]

mod common;
pub use common::*;
// Public re-export so downstream crates can access `ordermgmt` via
// `ordermgmt_tonic_core::ordermgmt`
pub use ordermgmt;
