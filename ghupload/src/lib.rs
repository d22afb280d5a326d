pub mod cli;
pub mod github;
pub mod proc;

pub use cli::{run, Cli, Commands};
