//! Command implementations

pub mod all;
pub mod headers;
pub mod inject;
pub mod payloads;
pub mod points;
