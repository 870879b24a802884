//! Command-line argument parsing.

use std::path::PathBuf;

/// What the command line asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    /// Configuration file to use instead of the default location.
    pub config: Option<PathBuf>,
    pub show_help: bool,
    /// Problems found while parsing, reported once `main` is running.
    pub warnings: Vec<String>,
}

pub const USAGE: &str = "\
usage: amvim [--config <path>]

Reads whitespace-separated key tokens from stdin and dispatches them.
Lines starting with `:` are host events:
  :select     the host now has a non-empty selection
  :clear      the host selection is empty
  :focus      another editor got focus
  :replace N TEXT
              replace N previous characters with TEXT";

/// Parse the process arguments.
pub fn parse_args() -> CliArgs {
    parse(std::env::args().skip(1))
}

fn parse(args: impl IntoIterator<Item = String>) -> CliArgs {
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => match args.next() {
                Some(path) => parsed.config = Some(PathBuf::from(path)),
                None => {
                    parsed.warnings.push(format!("{arg} needs a path"));
                    parsed.show_help = true;
                }
            },
            "-h" | "--help" => parsed.show_help = true,
            other => parsed.warnings.push(format!("Ignoring unknown argument: {other}")),
        }
    }

    parsed
}
