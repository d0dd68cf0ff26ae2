//! Config command implementation
//!
//! `show` prints the merged configuration together with the limits the
//! checker derives from it; `path` lists both config files.

use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::app::App;
use crate::cli::OutputContext;
use crate::config::RuntimeConfig;
use crate::models::config::SchemataConfig;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write the global config file (~/.config/schemata/config.toml)
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the effective configuration and checker limits
    Show {
        /// Global file only, without project settings or environment overrides
        #[arg(long)]
        global: bool,
    },

    /// Show both config file locations
    Path,
}

#[derive(Serialize)]
struct ConfigFile {
    path: String,
    exists: bool,
}

impl ConfigFile {
    fn new(path: &Path, ctx: &OutputContext) -> Self {
        Self {
            path: ctx.relative_path(path),
            exists: path.exists(),
        }
    }
}

#[derive(Serialize)]
struct ConfigShowResponse<'a> {
    level: &'static str,
    config: &'a SchemataConfig,
    limits: RuntimeConfig,
}

#[derive(Serialize)]
struct ConfigPathResponse {
    project: ConfigFile,
    global: ConfigFile,
}

pub async fn execute(args: ConfigArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let service = &app.config_service;

    match args.command {
        ConfigCommand::Init { force } => match service.init(true, force).await {
            Ok(path) => ctx.print_success_flat(ConfigFile::new(&path, ctx)),
            Err(e) => ctx.print_error(&e.to_string()),
        },

        ConfigCommand::Show { global } => match service.load(global).await {
            Ok(config) => ctx.print_success_flat(ConfigShowResponse {
                level: if global { "global" } else { "merged" },
                limits: RuntimeConfig::from(&config),
                config: &config,
            }),
            Err(e) => ctx.print_error(&e.to_string()),
        },

        ConfigCommand::Path => ctx.print_success_flat(ConfigPathResponse {
            project: ConfigFile::new(&service.config_path(false), ctx),
            global: ConfigFile::new(&service.config_path(true), ctx),
        }),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_limits_follow_checker_config() {
        let mut config = SchemataConfig::default();
        config.checker.max_path_depth = 8;
        let limits = RuntimeConfig::from(&config);
        assert_eq!(limits.max_path_depth, 8);
        assert_eq!(limits.max_load_depth, config.checker.max_load_depth);
    }

    #[test]
    fn test_config_file_paths_are_relative_to_root() {
        let ctx = OutputContext::new(PathBuf::from("/project"), false);
        let file = ConfigFile::new(Path::new("/project/.schemata/config.toml"), &ctx);
        assert_eq!(file.path, ".schemata/config.toml");
        assert!(!file.exists);
    }
}
