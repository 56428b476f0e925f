// src/process/mod.rs
//! Field-level normalisation shared by the source readers.

pub mod date_parser;
pub mod utils;

pub use date_parser::{normalize_date, parse_date};
pub use utils::{clean_str, find_column, join_nonempty, parse_amount};
