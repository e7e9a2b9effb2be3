//! Command line interface

pub mod args;
pub mod output;

pub use args::{Args, Command, FetchArgs, ServeArgs, VerbosityLevel};
pub use output::OutputFormatter;
