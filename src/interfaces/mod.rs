//! Outer surfaces: the HTTP webhook endpoint and CSV order import/export.

pub mod csv;
pub mod http;
