//! Shared utilities: Arrow column access, table I/O, logging and progress

pub mod arrow;
pub mod io;
pub mod logging;
