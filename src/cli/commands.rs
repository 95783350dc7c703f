use crate::catalog::CatalogKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Resolve prebuilt wheel URLs from compatibility catalogs
#[derive(Parser, Debug)]
#[command(
    name = "wheelmatch",
    about = "Resolve prebuilt wheel URLs from compatibility catalogs",
    version,
    author,
    long_about = "wheelmatch reads a compatibility catalog (a markdown document of pipe \
                  tables or a structured JSON index) and picks the download URL of the \
                  build matching a framework version, accelerator tag and language version."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Verbose logging (debug level)"
    )]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only errors are logged"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Resolve the download URL for a package build",
        long_about = "Loads the catalog, then walks the fallback tiers (markdown) or scores \
                      candidates (JSON) until a compatible build is found.\n\n\
                      Examples:\n  \
                      wheelmatch resolve --catalog wheels.md --package flash-attn \\\n    \
                      --torch 2.8.0 --cuda cu129 --python 3.12\n  \
                      wheelmatch resolve --catalog https://example.com/index.json \\\n    \
                      --package flash-attn --torch 2.8.0 --cuda 12.8 --python 3.12 --format json"
    )]
    Resolve(ResolveArgs),

    #[command(
        about = "Extract the tables of a markdown catalog",
        long_about = "Prints (or writes) every table recovered from a markdown catalog, \
                      with its heading path and ordinal, for auditing.\n\n\
                      Examples:\n  \
                      wheelmatch tables --catalog wheels.md\n  \
                      wheelmatch tables --catalog wheels.md --output tables.json"
    )]
    Tables(TablesArgs),

    #[command(about = "Normalize an accelerator tag (cu129 -> 12.9)")]
    Tag(TagArgs),

    #[command(about = "Show effective configuration")]
    Config(ConfigArgs),
}

/// Where the catalog comes from and how it is read.
#[derive(Args, Debug, Clone, Default)]
pub struct CatalogArgs {
    #[arg(
        short = 'c',
        long,
        value_name = "PATH|URL",
        help = "Catalog location (defaults to WHEELMATCH_CATALOG_URL)"
    )]
    pub catalog: Option<String>,

    #[arg(long, help = "Bypass the on-disk catalog cache")]
    pub no_cache: bool,

    #[arg(long, value_name = "SECONDS", help = "Catalog request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, value_name = "MARKER", allow_hyphen_values = true, help = "Level-1 heading marker (default \"# \")")]
    pub h1: Option<String>,

    #[arg(long, value_name = "MARKER", allow_hyphen_values = true, help = "Level-2 heading marker (default \"## \")")]
    pub h2: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub source: CatalogArgs,

    #[arg(
        long,
        value_name = "KIND",
        default_value = "auto",
        value_parser = parse_catalog_kind,
        help = "Catalog kind: auto, markdown or json"
    )]
    pub kind: KindArg,

    #[arg(short = 'p', long, help = "Package name as listed in the catalog")]
    pub package: String,

    #[arg(long, value_name = "X.Y.Z", help = "Framework (torch) version")]
    pub torch: String,

    #[arg(long, value_name = "TAG", help = "Accelerator tag, cuNNN or NN.N")]
    pub cuda: String,

    #[arg(long, value_name = "X.Y", help = "Python version")]
    pub python: String,

    #[arg(long, help = "Accept version-neutral builds (abi3, py3, cpNN+)")]
    pub abi_relaxation: bool,

    #[arg(long, value_name = "LINE", help = "Release line to prefer, e.g. 2.2")]
    pub variant: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Args, Debug, Clone)]
pub struct TablesArgs {
    #[command(flatten)]
    pub source: CatalogArgs,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write the table document to file instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "json",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Args, Debug, Clone)]
pub struct TagArgs {
    #[arg(value_name = "TAG", help = "Accelerator tag, e.g. cu129")]
    pub tag: String,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

/// `--kind` value; `None` means detect from content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindArg(pub Option<CatalogKind>);

fn parse_catalog_kind(s: &str) -> Result<KindArg, String> {
    CatalogKind::from_arg(s).map(KindArg).map_err(|e| e.to_string())
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
