//! CLI module for Haggle

pub mod app;
pub mod commands;

pub use app::{Flow, GameEvent, HaggleApp};
pub use commands::{Cli, Commands, PlayArgs};
