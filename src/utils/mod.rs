//! Utility modules shared by the build, watch and serve commands.

pub mod date;
pub mod log;
