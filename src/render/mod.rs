//! Hand-off to the external chart renderer.

pub mod json;

pub use json::write_charts;
