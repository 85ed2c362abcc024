//! calcpanel-cli library, exposed for integration tests.

pub mod commands;
pub mod host;
