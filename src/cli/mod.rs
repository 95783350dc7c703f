pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, ConfigArgs, ResolveArgs, TablesArgs, TagArgs};
pub use output::{OutputFormat, OutputFormatter};
