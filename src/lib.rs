//! Unitscan library crate
//!
//! This crate provides both a CLI binary and a library API for programmatic use

pub mod archive;
pub mod classify;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod index;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod state;
pub mod theme;
