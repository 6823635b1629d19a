//! Paint price sheet generator library
//!
//! Loads product identifiers, fetches name and price for each from the
//! catalogue, and renders the results as a printable price sheet. The binary
//! in `main.rs` wires these steps together; they are exposed here for
//! integration tests.

pub mod cache;
pub mod cli;
pub mod data;
pub mod pipeline;
pub mod render;
