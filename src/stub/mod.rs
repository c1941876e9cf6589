pub mod config;
pub mod error;
pub mod outcome;
pub mod process;
pub mod request;
pub mod runner;
