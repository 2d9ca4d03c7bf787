//! CLI argument definitions for gvas

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gvas")]
#[command(about = "GVAS save file converter", long_about = None)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the property list ends in the container
#[derive(Args, Debug, Clone, Default)]
pub struct BoundaryArgs {
    /// Number of properties to decode before the tail (defaults to the configured count)
    #[arg(short = 'n', long = "properties", value_name = "COUNT")]
    pub property_count: Option<usize>,

    /// Decode properties up to this byte offset (decimal or 0x-prefixed hex)
    #[arg(
        long,
        value_name = "OFFSET",
        value_parser = parse_offset,
        conflicts_with = "property_count"
    )]
    pub until_offset: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode a save file to JSON (stdout or -o file)
    #[command(visible_alias = "d")]
    Decode {
        /// Path to .sav file
        input: PathBuf,

        /// Path to output JSON file (uses stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        boundary: BoundaryArgs,

        /// Pretty-print the JSON (also enabled by the configured default)
        #[arg(short, long)]
        pretty: bool,
    },

    /// Encode JSON (positional file or stdin) back to a save file
    #[command(visible_alias = "e")]
    Encode {
        /// JSON input file (reads stdin if not provided)
        input: Option<PathBuf>,

        /// Path to output .sav file (uses stdout when it is redirected)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that a save file survives decode/encode and the JSON round trip
    #[command(visible_alias = "v")]
    Verify {
        /// Path to .sav file
        input: PathBuf,

        #[command(flatten)]
        boundary: BoundaryArgs,
    },

    /// Show header fields and the decoded property list
    #[command(visible_alias = "i")]
    Info {
        /// Path to .sav file
        input: PathBuf,

        #[command(flatten)]
        boundary: BoundaryArgs,
    },

    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set the default number of properties to decode
        #[arg(long)]
        property_count: Option<usize>,

        /// Set whether JSON output is pretty-printed by default
        #[arg(long)]
        pretty: Option<bool>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

/// Parse a byte offset given as decimal or `0x`-prefixed hex
pub fn parse_offset(s: &str) -> Result<usize, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => s.parse::<usize>(),
    };
    parsed.map_err(|e| format!("invalid offset '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("128"), Ok(128));
        assert_eq!(parse_offset("0x80"), Ok(128));
        assert_eq!(parse_offset("0X1f"), Ok(31));
        assert!(parse_offset("0xzz").is_err());
        assert!(parse_offset("-1").is_err());
    }

    #[test]
    fn test_boundary_flags_conflict() {
        let result = Cli::try_parse_from([
            "gvas",
            "info",
            "save.sav",
            "--properties",
            "2",
            "--until-offset",
            "0x100",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_args() {
        let cli = Cli::try_parse_from(["gvas", "decode", "save.sav", "-n", "3", "-p"]).unwrap();
        match cli.command {
            Commands::Decode {
                input,
                output,
                boundary,
                pretty,
            } => {
                assert_eq!(input, PathBuf::from("save.sav"));
                assert!(output.is_none());
                assert_eq!(boundary.property_count, Some(3));
                assert!(boundary.until_offset.is_none());
                assert!(pretty);
            }
            _ => panic!("expected decode command"),
        }
    }
}
