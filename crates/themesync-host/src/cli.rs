use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use themesync::{ResolvedScheme, SyncConfig, SystemPreference, ThemeMode};

#[derive(Debug, Parser)]
#[command(name = "themesync", version, about = "Drive a themesync provider from host events")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Mount a provider and apply newline-delimited JSON events
    Run(RunArgs),
    /// Print the scheme a mode resolves to
    Resolve {
        #[arg(value_parser = parse_mode)]
        mode: ThemeMode,
        /// System preference to resolve against
        #[arg(long, value_enum, default_value_t = SystemArg::Detect)]
        system: SystemArg,
    },
    /// Print the detected OS color scheme preference
    Detect,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// YAML or JSON configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Initial theme mode (overrides the config file)
    #[arg(long, value_parser = parse_mode)]
    pub initial: Option<ThemeMode>,

    /// Starting system preference
    #[arg(long, value_enum, default_value_t = SystemArg::Detect)]
    pub system: SystemArg,

    /// Scheme assumed while the system preference is unavailable
    #[arg(long, value_parser = parse_scheme)]
    pub fallback: Option<ResolvedScheme>,

    /// The page's own origin; messages from it are trusted
    #[arg(long)]
    pub origin: Option<String>,

    /// Additional trusted origin (repeatable)
    #[arg(long = "trust")]
    pub trusted: Vec<String>,

    /// Read events from a file instead of stdin
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

impl RunArgs {
    /// Loads the config file, if any, and layers the flags over it.
    pub fn load_config(&self) -> Result<SyncConfig> {
        let mut config = match &self.config {
            Some(path) => SyncConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => SyncConfig::default(),
        };
        if let Some(mode) = self.initial {
            config.initial_theme = mode;
        }
        if let Some(fallback) = self.fallback {
            config.system_fallback = fallback;
        }
        if let Some(origin) = &self.origin {
            config.self_origin = Some(origin.clone());
        }
        config.trusted_origins.extend(self.trusted.iter().cloned());
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SystemArg {
    Light,
    Dark,
    Unavailable,
    /// Ask the OS
    Detect,
}

impl SystemArg {
    /// The fixed preference, or `None` when it should be detected.
    pub fn preference(self) -> Option<Option<bool>> {
        match self {
            SystemArg::Light => Some(Some(false)),
            SystemArg::Dark => Some(Some(true)),
            SystemArg::Unavailable => Some(None),
            SystemArg::Detect => None,
        }
    }

    pub fn signal(self) -> SystemPreference {
        match self.preference() {
            Some(value) => SystemPreference::new(value),
            None => SystemPreference::detect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

fn parse_mode(s: &str) -> Result<ThemeMode, String> {
    s.parse().map_err(|e: themesync::ParseModeError| e.to_string())
}

fn parse_scheme(s: &str) -> Result<ResolvedScheme, String> {
    s.parse().map_err(|e: themesync::ParseModeError| e.to_string())
}
