//! Input schema for hypnogram rows
//!
//! This module defines the raw row shape (`timestamp`, `sleep_stage`) and the
//! readers that load it from CSV, JSON arrays and NDJSON.

mod raw_row;
mod reader;

pub use raw_row::*;
pub use reader::*;
