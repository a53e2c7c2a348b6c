//! Configuration and CLI argument handling

use clap::Parser;

use crate::workout::WorkoutConfig;

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "interval-timer")]
#[command(about = "An interval workout timer with an HTTP control surface")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Preparation countdown in seconds (0-300)
    #[arg(long, default_value = "10", allow_negative_numbers = true)]
    pub prepare: i64,

    /// Work interval in seconds (1-600)
    #[arg(short, long, default_value = "180", allow_negative_numbers = true)]
    pub work: i64,

    /// Rest between cycles in seconds (0-600)
    #[arg(short, long, default_value = "60", allow_negative_numbers = true)]
    pub rest: i64,

    /// Rest between sets in seconds (0-900)
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub rest_between_sets: i64,

    /// Work/rest cycles in each set (1-50)
    #[arg(short, long, default_value = "12", allow_negative_numbers = true)]
    pub cycles_per_set: i64,

    /// Number of sets (1-50)
    #[arg(short, long, default_value = "1", allow_negative_numbers = true)]
    pub sets: i64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Workout described by the flags, clamped into range
    pub fn workout(&self) -> WorkoutConfig {
        WorkoutConfig::new(
            self.prepare,
            self.work,
            self.rest,
            self.cycles_per_set,
            self.sets,
            self.rest_between_sets,
        )
    }
}
