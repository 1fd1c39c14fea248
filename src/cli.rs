//! CLI argument parsing with clap.

use clap::Parser;

use crate::config::Config;

/// Image generation proxy: turns prompts into stored images with queryable
/// metadata.
#[derive(Parser, Debug)]
#[command(name = "pixyproxy", version, about)]
pub struct Cli {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Address to listen on, e.g. 127.0.0.1:8000.
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Directory holding generated image files.
    #[arg(short, long)]
    pub images_dir: Option<String>,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Overlay flag values onto `config`; flags win over file and environment.
    pub fn apply(&self, config: &mut Config) {
        if let Some(bind) = &self.bind {
            config.server.bind.clone_from(bind);
        }
        if let Some(dir) = &self.images_dir {
            config.server.images_dir = dir.into();
        }
        if self.verbose {
            config.server.log_level = "debug".to_string();
        }
    }
}
