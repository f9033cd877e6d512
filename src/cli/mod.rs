pub mod commands;

pub use commands::{Cli, Commands, DateArgs, RecordArgs};
