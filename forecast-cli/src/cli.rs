use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use forecast_core::{ForecastClient, ForecastConfig, ForecastEnd, HourlyRecord, JsonFileSink};
use serde_json::Value;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Hourly weather forecast CLI")]
pub struct Cli {
    /// Use this config file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show hourly forecast from a start date up to an end date.
    Show {
        /// End of the range: YYYY-MM-DD, or a number of days after the start.
        #[arg(allow_negative_numbers = true)]
        end: ForecastEnd,

        /// Start date (YYYY-MM-DD); if absent, means "today".
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Location to query, overriding the config file.
        #[arg(long)]
        location: Option<String>,

        /// File holding the API key, overriding the config file.
        #[arg(long)]
        secret: Option<PathBuf>,

        /// Print records as JSON instead of a table.
        #[arg(long)]
        json: bool,

        /// Also dump the records as JSON into this file.
        #[arg(long)]
        dump: Option<PathBuf>,
    },

    /// Print the config file path and the effective configuration.
    Config,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = match &self.config {
            Some(path) => ForecastConfig::load_from(path)?,
            None => ForecastConfig::load()?,
        };

        match self.command {
            Command::Show { end, from, location, secret, json, dump } => {
                if let Some(location) = location {
                    config.location = location;
                }
                if let Some(secret) = secret {
                    config.secret_file = secret;
                }

                let mut client = ForecastClient::new(config)?;
                if let Some(dump) = dump {
                    client = client.with_sink(JsonFileSink::new(dump));
                }

                let records = client.get_forecast(end, from).await?;

                if json {
                    let out = serde_json::to_string_pretty(&records)
                        .context("Failed to serialize forecast records")?;
                    println!("{out}");
                } else {
                    print!("{}", render_table(&records));
                }
            }
            Command::Config => {
                let path = match self.config {
                    Some(path) => path,
                    None => ForecastConfig::config_file_path()?,
                };
                println!("# {}", path.display());
                print!("{}", config.to_toml()?);
            }
        }

        Ok(())
    }
}

const TABLE_COLUMNS: &[(&str, &str)] = &[
    ("date", "Date"),
    ("time", "Time"),
    ("temp", "Temp"),
    ("feelslike", "Feels"),
    ("precipprob", "Precip%"),
    ("windspeed", "Wind"),
    ("conditions", "Conditions"),
];

/// Render records as a fixed-column table; missing fields show as `-`.
fn render_table(records: &[HourlyRecord]) -> String {
    if records.is_empty() {
        return "No hourly data returned for this range.\n".to_string();
    }

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| TABLE_COLUMNS.iter().map(|(key, _)| cell(r.get(*key))).collect())
        .collect();

    let widths: Vec<usize> = TABLE_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, (_, title))| {
            rows.iter().map(|row| row[i].chars().count()).fold(title.len(), usize::max)
        })
        .collect();

    let mut out = String::new();
    let header: Vec<&str> = TABLE_COLUMNS.iter().map(|(_, title)| *title).collect();
    push_row(&mut out, header.iter().copied(), &widths);
    for row in &rows {
        push_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> =
        cells.zip(widths.iter().copied()).map(|(cell, width)| format!("{cell:<width$}")).collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
