use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "towertrack-api")]
#[command(about = "TowerTrack API - residential building management backend")]
#[command(version)]
pub struct Cli {
    #[arg(long, env = "PORT", global = true, help = "Port to listen on (overrides configuration)")]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    #[command(about = "Reconcile agreements and serve the API (default)")]
    Serve,

    #[command(about = "Deduplicate agreements, install the uniqueness constraint and exit")]
    Reconcile,
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.unwrap_or(Commands::Serve)
    }
}
