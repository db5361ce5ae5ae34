use crate::error::AppError;
use crate::scheduling;
use crate::server;
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Tutoring Marketplace Service",
    about = "Run the tutoring-marketplace workflow service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Timezone lookups and conversions for support staff
    Zones {
        #[command(subcommand)]
        command: ZonesCommand,
    },
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum ZonesCommand {
    /// List the zones known for a country (and optional US state)
    List(ZonesListArgs),
    /// Convert a wall-clock time in a zone to UTC, or back
    Convert(ZonesConvertArgs),
}

#[derive(Args, Debug)]
struct ZonesListArgs {
    /// ISO 3166 alpha-2 country code, e.g. BO or US
    #[arg(long)]
    country: String,
    /// US state code, e.g. TX
    #[arg(long)]
    state: Option<String>,
}

#[derive(Args, Debug)]
struct ZonesConvertArgs {
    /// Zone identifier from `zones list`, e.g. America/La_Paz
    #[arg(long)]
    zone: String,
    /// Wall-clock timestamp (YYYY-MM-DDTHH:MM:SS)
    #[arg(long, value_parser = parse_datetime)]
    at: NaiveDateTime,
    /// Treat the timestamp as UTC and convert into the zone instead
    #[arg(long)]
    from_utc: bool,
}

fn parse_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%dT%H:%M:%S")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DDTHH:MM:SS ({err})"))
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Zones {
            command: ZonesCommand::List(args),
        } => run_zones_list(args),
        Command::Zones {
            command: ZonesCommand::Convert(args),
        } => run_zones_convert(args),
    }
}

fn run_zones_list(args: ZonesListArgs) -> Result<(), AppError> {
    match scheduling::timezones_for(&args.country, args.state.as_deref()) {
        Some(zones) => {
            println!(
                "Zones for {}{}",
                args.country.to_ascii_uppercase(),
                args.state
                    .as_deref()
                    .map(|state| format!("/{}", state.to_ascii_uppercase()))
                    .unwrap_or_default()
            );
            for zone in zones {
                println!("- {} | {} | {}", zone.id, zone.label, zone.offset_label());
            }
            if zones.len() > 1 {
                println!("Location spans multiple zones; postings there need an explicit choice.");
            }
            Ok(())
        }
        None => {
            println!(
                "No timezone data for {}{}",
                args.country,
                args.state
                    .as_deref()
                    .map(|state| format!("/{state}"))
                    .unwrap_or_default()
            );
            Ok(())
        }
    }
}

fn run_zones_convert(args: ZonesConvertArgs) -> Result<(), AppError> {
    if args.from_utc {
        let utc = chrono::DateTime::from_naive_utc_and_offset(args.at, chrono::Utc);
        let local = scheduling::convert_from_utc(utc, &args.zone)?;
        println!("{} UTC -> {} {}", args.at, local, args.zone);
    } else {
        let utc = scheduling::convert_to_utc(args.at, &args.zone)?;
        println!("{} {} -> {} UTC", args.at, args.zone, utc.naive_utc());
    }
    Ok(())
}
