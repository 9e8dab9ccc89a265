pub mod cli_runner;
pub mod config;
pub mod debounce;
pub mod loader;
