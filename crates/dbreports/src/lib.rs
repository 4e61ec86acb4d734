#![forbid(unsafe_code)]

pub mod chart;
pub mod cli;
pub mod config;
pub mod models;
pub mod movies;
pub mod sqlite;
pub mod traffic;
pub mod utils;

pub use cli::app::{Cli, Command};
