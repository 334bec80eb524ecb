//! Log Record Reader: row-oriented benchmark result files.

pub mod parse;
pub mod row;

pub use parse::{LogStyle, read_rows};
pub use row::ResultRow;
