use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cityweather_core::{Config, ConsoleReporter, Orchestrator, RunContext, providers_from_config};
use inquire::{CustomType, Text};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "Current weather for a list of cities")]
pub struct Cli {
    /// Use this config file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up every city concurrently and print its weather (the default).
    Run {
        /// City to look up; repeat for several. Replaces the configured list.
        #[arg(long = "city", value_name = "NAME")]
        cities: Vec<String>,

        /// Deadline for the whole run, in seconds.
        #[arg(long, value_name = "SECS")]
        deadline: Option<u64>,
    },

    /// Interactively edit the city list and deadline.
    Configure,

    /// Print where the config file lives.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let command = self.command.unwrap_or(Command::Run {
            cities: Vec::new(),
            deadline: None,
        });

        match command {
            Command::Run { cities, deadline } => {
                let mut config = load_config(self.config.as_ref())?;
                if !cities.is_empty() {
                    config.set_cities(&cities);
                }
                if let Some(secs) = deadline {
                    config.deadline_secs = secs;
                }
                config.validate()?;

                run_lookups(&config).await
            }
            Command::Configure => configure(self.config),
            Command::ConfigPath => {
                let path = match self.config {
                    Some(path) => path,
                    None => Config::config_file_path()?,
                };
                println!("{}", path.display());
                Ok(())
            }
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

async fn run_lookups(config: &Config) -> anyhow::Result<()> {
    let (resolver, fetcher) =
        providers_from_config(config).context("Failed to set up the HTTP client")?;
    let orchestrator = Orchestrator::new(resolver, fetcher);

    let ctx = RunContext::with_timeout(config.deadline());
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling outstanding lookups");
            interrupt.cancel();
        }
    });

    let mut reporter = ConsoleReporter::stdout();
    orchestrator.run(&config.cities, &ctx, &mut reporter).await;

    // Per-city failures are already printed; the run itself succeeded.
    Ok(())
}

fn configure(path: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = load_config(path.as_ref())?;

    let cities = Text::new("Cities (comma-separated):")
        .with_default(&config.cities.join(", "))
        .prompt()
        .context("Failed to read city list")?;
    config.set_cities(cities.split(','));

    config.deadline_secs = CustomType::<u64>::new("Deadline in seconds:")
        .with_default(config.deadline_secs)
        .with_error_message("Please enter a whole number of seconds")
        .prompt()
        .context("Failed to read deadline")?;

    config.validate()?;

    let saved_to = match path {
        Some(path) => {
            config.save_to(&path)?;
            path
        }
        None => config.save()?,
    };
    println!("Saved configuration to {}", saved_to.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_defaults_to_run() {
        let cli = Cli::try_parse_from(["cityweather"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn run_accepts_repeated_cities_and_deadline() {
        let cli = Cli::try_parse_from([
            "cityweather",
            "run",
            "--city",
            "Oslo",
            "--city",
            "Bergen",
            "--deadline",
            "3",
        ])
        .unwrap();

        match cli.command {
            Some(Command::Run { cities, deadline }) => {
                assert_eq!(cities, vec!["Oslo".to_string(), "Bergen".to_string()]);
                assert_eq!(deadline, Some(3));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["cityweather", "config-path", "--config", "/tmp/cw.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/cw.toml")));
        assert!(matches!(cli.command, Some(Command::ConfigPath)));
    }

    #[test]
    fn deadline_must_be_numeric() {
        assert!(Cli::try_parse_from(["cityweather", "run", "--deadline", "soon"]).is_err());
    }
}
