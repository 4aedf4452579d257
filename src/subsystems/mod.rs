//! Subsystem modules for the expense bot.

pub mod comms;
pub mod dialog;
pub mod runtime;
