//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Pressline static site asset pipeline CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: pressline.toml)
    #[arg(short = 'C', long, global = true, default_value = "pressline.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the asset pipeline over the build directory
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },
}

/// Build command arguments
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Build directory holding the HTML and referenced assets (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub input: Option<PathBuf>,

    /// Publish directory (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Minify the final HTML markup
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,

    /// Clean the publish directory completely before building
    #[arg(short, long)]
    pub clean: bool,

    /// Load the transform cache before the run and store it afterwards
    #[arg(long = "persist-cache", action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub persist_cache: Option<bool>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_flags() {
        let cli = Cli::try_parse_from([
            "pressline", "build", "-i", "site", "-o", "out", "-m", "false", "--clean", "-V",
        ])
        .unwrap();
        let Commands::Build { build_args } = cli.command;
        assert_eq!(build_args.input, Some(PathBuf::from("site")));
        assert_eq!(build_args.output, Some(PathBuf::from("out")));
        assert_eq!(build_args.minify, Some(false));
        assert!(build_args.clean);
        assert!(build_args.verbose);
        assert_eq!(build_args.persist_cache, None);
    }

    #[test]
    fn test_optional_bool_flag_without_value() {
        let cli = Cli::try_parse_from(["pressline", "build", "--persist-cache"]).unwrap();
        let Commands::Build { build_args } = cli.command;
        assert_eq!(build_args.persist_cache, Some(true));
    }

    #[test]
    fn test_global_config_path() {
        let cli = Cli::try_parse_from(["pressline", "build", "-C", "site.toml"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("site.toml"));

        let cli = Cli::try_parse_from(["pressline", "b"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("pressline.toml"));
    }
}
