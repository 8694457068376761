pub mod cli;
pub mod gh;
pub mod load_config;

pub use cli::{run, run_with_output, Cli, Commands};
