//! Unsaved-work tracking and recovery for calculator panels embedded in a
//! host application.

pub mod api;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod recovery;
pub mod state;
pub mod surface;
