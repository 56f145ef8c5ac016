//! Project configuration management for `pressline.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build/     # [build], [build.js], [build.css]
//! │   └── cache      # [cache]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # PresslineConfig (this file)
//! ```
//!
//! The config file is optional: without one, every section takes its
//! defaults and the current directory is the project root.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{BuildSectionConfig, CacheConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{BuildArgs, Cli, Commands},
    log,
    stage::StageContext,
    utils::path::normalize_path,
};
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing pressline.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresslineConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Build settings
    #[serde(default)]
    pub build: BuildSectionConfig,

    /// Transform cache settings
    #[serde(default)]
    pub cache: CacheConfig,
}

impl PresslineConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. The project root is the
    /// config file's parent directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let (config_path, exists) = Self::resolve_config_path(cli)?;

        let mut config = if exists {
            Self::from_path(&config_path)?
        } else {
            crate::debug!("config"; "{} not found, using defaults", cli.config.display());
            Self::default()
        };

        config.config_path = config_path;
        config.finalize(cli);
        config.validate()?;

        Ok(config)
    }

    /// Resolve config file path, returning whether it exists.
    fn resolve_config_path(cli: &Cli) -> Result<(PathBuf, bool)> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        match find_config_file(&cli.config) {
            Some(path) => Ok((path, true)),
            None => Ok((cwd.join(&cli.config), false)),
        }
    }

    /// Finalize configuration after loading.
    fn finalize(&mut self, cli: &Cli) {
        let root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        match &cli.command {
            Commands::Build { build_args } => {
                self.apply_build_args(build_args);
                self.normalize_paths(&root, build_args);
            }
        }
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Settings the stages read, with patterns and browser targets compiled.
    pub fn stage_context(&self) -> Result<StageContext> {
        let css = &self.build.css;
        Ok(StageContext {
            build_root: self.build.input.clone(),
            js_root: self.build.js.root.clone(),
            bundle: self.build.js.bundle_options(&css.browsers),
            ignore: css
                .ignore_patterns()
                .context("invalid `[build.css] ignore` pattern")?,
            targets: css.targets().map_err(|e| anyhow!("invalid browser query: {e}"))?,
        })
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply build arguments from CLI.
    fn apply_build_args(&mut self, args: &BuildArgs) {
        crate::logger::set_verbose(args.verbose);

        Self::update_option(&mut self.build.minify, args.minify.as_ref());
        Self::update_option(&mut self.cache.persist, args.persist_cache.as_ref());
        if args.clean {
            self.build.clean = true;
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Normalize all paths relative to root directory.
    fn normalize_paths(&mut self, root: &Path, args: &BuildArgs) {
        Self::update_option(&mut self.build.input, args.input.as_ref());
        Self::update_option(&mut self.build.output, args.output.as_ref());

        let root = normalize_path(root);
        self.config_path = normalize_path(&self.config_path);
        self.build.input = normalize_path(&root.join(&self.build.input));
        self.build.output = normalize_path(&root.join(&self.build.output));
        self.cache.path = Self::expand_path(&self.cache.path, &root);
        self.root = root;
    }

    /// Normalize a path with tilde expansion.
    fn expand_path(path: &Path, root: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        let path = PathBuf::from(expanded);
        let full_path = if path.is_relative() {
            root.join(&path)
        } else {
            path
        };
        normalize_path(&full_path)
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();
        self.build.validate(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> PresslineConfig {
    let (parsed, ignored) = PresslineConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["pressline"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn project(config: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("build")).unwrap();
        let path = dir.path().join("pressline.toml");
        fs::write(&path, config).unwrap();
        (dir, path)
    }

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(PresslineConfig::from_str("[build\ninput = \"x\"").is_err());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[build]\nminify = false\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = PresslineConfig::parse_with_ignored(content).unwrap();
        assert!(!config.build.minify);
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_load_resolves_paths_against_config_dir() {
        let (dir, path) = project("[build]\noutput = \"site\"\n[cache]\npath = \"tmp/cache.json\"");
        let config = PresslineConfig::load(&cli(&["build", "-C", path.to_str().unwrap()])).unwrap();

        let root = normalize_path(dir.path());
        assert_eq!(config.get_root(), root);
        assert_eq!(config.build.input, root.join("build"));
        assert_eq!(config.build.output, root.join("site"));
        assert_eq!(config.cache.path, root.join("tmp/cache.json"));
    }

    #[test]
    fn test_cli_overrides_config() {
        let (dir, path) = project("[build]\nminify = true\n");
        fs::create_dir_all(dir.path().join("src")).unwrap();
        let config = PresslineConfig::load(&cli(&[
            "build",
            "-C",
            path.to_str().unwrap(),
            "-i",
            "src",
            "-m",
            "false",
            "--clean",
            "--persist-cache",
        ]))
        .unwrap();

        assert_eq!(config.build.input, normalize_path(&dir.path().join("src")));
        assert!(!config.build.minify);
        assert!(config.build.clean);
        assert!(config.cache.persist);
    }

    #[test]
    fn test_validation_errors_are_collected() {
        let (_dir, path) = project("[build]\nimages = [\".png\"]\n[build.js]\nroot = \"js\"");
        let err = PresslineConfig::load(&cli(&["build", "-C", path.to_str().unwrap()]))
            .unwrap_err();
        match err.downcast_ref::<ConfigError>() {
            Some(ConfigError::Diagnostics(diag)) => assert_eq!(diag.len(), 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_stage_context() {
        let config = test_parse_config("[build.js]\nroot = \"/scripts/\"\nbundle_name = \"app\"");
        let ctx = config.stage_context().unwrap();
        assert_eq!(ctx.js_root, "/scripts/");
        assert_eq!(ctx.bundle.name, "app");
        assert_eq!(ctx.bundle.browsers, config.build.css.browsers);
        assert_eq!(ctx.bundle.target, None);
        assert_eq!(ctx.ignore.len(), 3);
    }
}
