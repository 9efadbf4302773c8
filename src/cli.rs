use crate::config::DEFAULT_CONFIG_FILES;
use crate::logging::Verbosity;
use crate::platform::Variant;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::path::{Path, PathBuf};

/// Command line of `bunenv`.
#[derive(Parser, Debug, Default)]
#[command(name = "bunenv")]
#[command(author, version, about = "Bun.js virtual environment builder", long_about = None)]
#[command(override_usage = "bunenv [OPTIONS] DEST_DIR")]
pub struct Cli {
    /// The Bun version to use, e.g. --bun=1.0.0 will use bun-v1.0.0 to create the
    /// new environment. The default is the last stable version (`latest`).
    /// Use `system` to use the system-wide bun.
    #[arg(short = 'b', long = "bun", value_name = "BUN_VER")]
    pub bun: Option<String>,

    /// Bun variant to install: "", baseline, profile or musl.
    /// Default is auto-detected based on platform.
    #[arg(long, value_name = "VARIANT")]
    pub variant: Option<Variant>,

    /// GitHub API token to avoid rate limits when fetching versions
    #[arg(long)]
    pub github_token: Option<String>,

    /// Mirror server for Bun downloads
    #[arg(long)]
    pub mirror: Option<String>,

    /// Verbose mode
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode
    #[arg(short, long)]
    pub quiet: bool,

    /// Load a different file than '~/.bunenvrc'. Pass an empty string for no
    /// config (use built-in defaults).
    #[arg(short = 'C', long = "config-file")]
    pub config_file: Option<String>,

    /// Install all the packages listed in the given requirements file
    #[arg(short, long, value_name = "FILENAME")]
    pub requirements: Option<PathBuf>,

    /// Alternative prompt prefix for this environment
    #[arg(long)]
    pub prompt: Option<String>,

    /// List available Bun versions
    #[arg(short, long)]
    pub list: bool,

    /// Install packages from file without bun
    #[arg(long)]
    pub update: bool,

    /// Use current python virtualenv
    #[arg(short = 'p', long)]
    pub python_virtualenv: bool,

    /// Remove "src" directory after installation
    #[arg(short = 'c', long)]
    pub clean_src: bool,

    /// Force installation in a pre-existing directory
    #[arg(long)]
    pub force: bool,

    /// Install Bun from prebuilt package (default and only option)
    #[arg(long)]
    pub prebuilt: bool,

    /// Ignore certificates for package downloads. - UNSAFE -
    #[arg(long = "ignore_ssl_certs")]
    pub ignore_ssl_certs: bool,

    /// Print the config defaults in INI form
    #[arg(long, hide = true)]
    pub dump_config_defaults: bool,

    /// Destination directory
    #[arg(value_name = "DEST_DIR")]
    pub env_dir: Option<PathBuf>,
}

impl Cli {
    /// Config files to load, resolving `--config-file`.
    ///
    /// An explicit file must exist; an empty value disables config files.
    pub fn config_files(&self) -> Result<Vec<String>, clap::Error> {
        match self.config_file.as_deref() {
            None => Ok(DEFAULT_CONFIG_FILES.iter().map(|f| f.to_string()).collect()),
            Some("") => Ok(Vec::new()),
            Some(file) => {
                if !Path::new(file).exists() {
                    return Err(Self::command().error(
                        ErrorKind::ValueValidation,
                        format!("Config file '{file}' doesn't exist!"),
                    ));
                }
                Ok(vec![file.to_string()])
            }
        }
    }

    /// Checks that need the config files to be loaded first.
    pub fn validate(&self) -> Result<(), clap::Error> {
        if !self.list && !self.python_virtualenv && self.env_dir.is_none() {
            return Err(Self::command().error(
                ErrorKind::MissingRequiredArgument,
                "You must provide a DEST_DIR or use current python virtualenv",
            ));
        }
        Ok(())
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}
