use clap::Parser;
use geodist::location::providers::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};
use geodist::location::{City, LocationResolver, SourceConfig, SourceKind};
use geodist::logging;
use geodist::report::{self, ReportError};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

/// geodist: find the closest pair among a few cities.
///
/// Coordinates come from a CSV file, the Nominatim geocoder, or a built-in
/// mock table. Distances are great-circle (haversine) kilometers.
///
/// Examples:
///   geodist --source mock
///   geodist --source csv --csv worldcities.csv
///   geodist --source api --city "Lima, Peru" --city "Quito, Ecuador"
#[derive(Parser)]
#[command(name = "geodist", version, about, long_about = None)]
struct Cli {
    /// Coordinate source: csv, api, mock (or 1, 2, 3). Prompts when omitted.
    #[arg(long, short = 's', value_parser = parse_source)]
    source: Option<SourceKind>,

    /// City to compare, as "City, Country". Repeat for each city.
    /// Defaults to Lima, Cusco and Arequipa (Peru).
    #[arg(long = "city", value_name = "CITY, COUNTRY", value_parser = parse_city)]
    cities: Vec<City>,

    /// CSV file with city, country, lat and lng columns.
    #[arg(long, env = "GEODIST_CSV")]
    csv: Option<PathBuf>,

    /// Nominatim base URL.
    #[arg(long, env = "GEODIST_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// HTTP timeout in seconds.
    #[arg(long, env = "GEODIST_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Print the full report as JSON.
    #[arg(long)]
    json: bool,

    /// Debug logging on stderr.
    #[arg(long, short = 'v')]
    verbose: bool,
}

const INVALID_OPTION_EXIT: i32 = 2;

fn parse_source(s: &str) -> Result<SourceKind, String> {
    s.parse()
}

fn parse_city(s: &str) -> Result<City, String> {
    s.parse()
}

fn main() {
    let cli = Cli::parse();
    logging::init_cli_logger(cli.verbose);

    // ── Pick the source ─────────────────────────────────────────

    let kind = match cli.source {
        Some(kind) => kind,
        None => prompt_source().unwrap_or_else(|| {
            eprintln!("Invalid option");
            std::process::exit(INVALID_OPTION_EXIT);
        }),
    };

    let config = SourceConfig {
        csv_path: cli.csv.clone().unwrap_or_else(SourceConfig::default_csv_path),
        endpoint: cli.endpoint.clone(),
        timeout: Duration::from_secs(cli.timeout),
    };
    tracing::debug!(source = %kind, ?config, "configured");

    let resolver = LocationResolver::new(kind, &config);

    // ── Compare ─────────────────────────────────────────────────

    let cities = if cli.cities.is_empty() {
        report::default_cities()
    } else {
        cli.cities.clone()
    };

    let report = report::closest_pair(&resolver, &cities).unwrap_or_else(|e: ReportError| {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    });

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        println!("{}", report.summary());
    }
}

/// Ask for the source on stdin. `None` for anything but 1, 2 or 3.
fn prompt_source() -> Option<SourceKind> {
    print!("Source (1: CSV, 2: API, 3: Mock): ");
    io::stdout().flush().ok()?;
    read_menu_choice(io::stdin().lock())
}

/// One line of menu input. EOF and read errors count as an invalid choice.
fn read_menu_choice(mut input: impl BufRead) -> Option<SourceKind> {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => SourceKind::from_menu_choice(&line),
    }
}
