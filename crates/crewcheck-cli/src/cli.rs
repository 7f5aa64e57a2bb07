use clap::{Parser, value_parser};
use crewcheck_core::RunnerConfig;
use std::path::PathBuf;

/// Command-line arguments for crewcheck
#[derive(Parser, Debug)]
#[command(name = "crewcheck")]
#[command(about = "Discover and run agent and crew test suites", long_about = None)]
#[command(version)]
pub struct Cli {
    #[arg(long, help = "Directory containing test modules")]
    pub test_dir: Option<PathBuf>,

    #[arg(long, help = "File name pattern of test modules, e.g. 'test_*.json'")]
    pub pattern: Option<String>,

    #[arg(
        short = 'v',
        long,
        value_name = "LEVEL",
        value_parser = value_parser!(u8).range(0..=2),
        help = "Output verbosity (0-2)"
    )]
    pub verbosity: Option<u8>,

    #[arg(long, help = "Write an HTML report")]
    pub report: bool,

    #[arg(long, help = "Path of the HTML report")]
    pub report_file: Option<PathBuf>,

    #[arg(long, help = "Configuration file (defaults to ./crewcheck.toml when present)")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Override configuration values with the flags that were given
    pub fn apply(&self, config: RunnerConfig) -> RunnerConfig {
        let mut config = match self.verbosity {
            Some(level) => config.with_verbosity(level),
            None => config,
        };
        if let Some(test_dir) = &self.test_dir {
            config.test_dir.clone_from(test_dir);
        }
        if let Some(pattern) = &self.pattern {
            config.pattern.clone_from(pattern);
        }
        if let Some(report_file) = &self.report_file {
            config.report_file.clone_from(report_file);
        }
        config.report |= self.report;
        config
    }
}
