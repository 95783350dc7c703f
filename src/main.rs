use wheelmatch::cli::commands::{CliArgs, Commands};
use wheelmatch::cli::handlers::{handle_config, handle_resolve, handle_tables, handle_tag};
use wheelmatch::util::logging::{self, parse_level, LoggingConfig};
use wheelmatch::{WheelmatchConfig, VERSION};

use clap::Parser;
use tracing::{debug, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("wheelmatch v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Resolve(resolve_args) => handle_resolve(resolve_args, args.verbose),
        Commands::Tables(tables_args) => handle_tables(tables_args),
        Commands::Tag(tag_args) => handle_tag(tag_args),
        Commands::Config(config_args) => handle_config(config_args),
    };

    std::process::exit(exit_code);
}

/// `--log-level` wins, then `-v`/`-q`, then `WHEELMATCH_LOG_LEVEL`.
fn init_logging_from_args(args: &CliArgs) {
    let mut config = LoggingConfig::from(&WheelmatchConfig::default());

    if let Some(level_str) = &args.log_level {
        config.level = parse_level(level_str);
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }

    logging::init_logging(config);
}
