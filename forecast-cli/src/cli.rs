use anyhow::bail;
use clap::{ArgAction, Parser, Subcommand};
use forecast_core::{Config, WeatherError, WeatherService};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Current weather by city name")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides it.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, e.g. "Paris" or "New York".
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,
    },

    /// Look up cities repeatedly, reusing cached results.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city } => {
                let city = city.join(" ");
                if city.trim().is_empty() {
                    bail!("Please enter a city name");
                }

                let service = WeatherService::from_config(Config::load()?)?;
                match service.fetch_weather(&city).await {
                    Ok(data) => println!("{}", render::weather_card(&data)),
                    Err(err) if err.is_cancelled() => {}
                    Err(err) => return Err(err.into()),
                }
                Ok(())
            }
            Command::Interactive => interactive().await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Requires a One Call API 3.0 subscription")
        .prompt()?;

    config.set_api_key(&key);
    if config.api_key.is_none() {
        bail!("API key must not be empty");
    }

    let path = config.save()?;
    println!("Saved API key to {}", path.display());
    Ok(())
}

/// What a line typed at the interactive prompt asks for.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Empty,
    Quit,
    ClearCache,
    City(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    match line.trim() {
        "" => Input::Empty,
        ":quit" | ":q" => Input::Quit,
        ":clear" => Input::ClearCache,
        _ => Input::City(line),
    }
}

async fn interactive() -> anyhow::Result<()> {
    let service = WeatherService::from_config(Config::load()?)?;

    loop {
        let line = match Text::new("City:")
            .with_help_message(":clear empties the cache, :quit exits")
            .prompt()
        {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };

        match classify(&line) {
            Input::Empty => println!("Please enter a city name"),
            Input::Quit => break,
            Input::ClearCache => {
                service.clear_cache();
                println!("Cache cleared");
            }
            Input::City(city) => match service.fetch_weather(city).await {
                Ok(data) => println!("{}\n", render::weather_card(&data)),
                Err(WeatherError::Cancelled) => {}
                Err(err) => eprintln!("{err}"),
            },
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_joins_multi_word_city() {
        let cli = Cli::try_parse_from(["forecast", "show", "New", "York"]).unwrap();
        match cli.command {
            Command::Show { city } => assert_eq!(city.join(" "), "New York"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_requires_a_city() {
        assert!(Cli::try_parse_from(["forecast", "show"]).is_err());
    }

    #[test]
    fn verbose_flag_counts() {
        let cli = Cli::try_parse_from(["forecast", "-vv", "interactive"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn classify_prompt_input() {
        assert_eq!(classify("   "), Input::Empty);
        assert_eq!(classify(":quit"), Input::Quit);
        assert_eq!(classify(" :clear "), Input::ClearCache);
        assert_eq!(classify("  Paris "), Input::City("  Paris "));
    }
}
