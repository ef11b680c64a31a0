//! Data models.

pub mod config;
pub mod continuity;
pub mod nature;
pub mod series;
