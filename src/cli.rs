use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::api::{self, ProjectArgs, build_projection_response};
use crate::config::AppConfig;
use crate::core::{ProjectionInput, project};
use crate::core::tax::{IncomePeriod, TaxInput, TaxSchedule, calculate_tax};
use crate::error::AppError;
use crate::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "fin360",
    about = "Buy-versus-invest projections, tax estimates and a personal ledger API",
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
    /// Project buying a house against investing the money, printed as JSON
    Project(ProjectArgs),
    /// Estimate income tax for the 2025 brackets, printed as JSON
    Tax(TaxArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliIncomePeriod {
    Annual,
    Monthly,
}

impl From<CliIncomePeriod> for IncomePeriod {
    fn from(value: CliIncomePeriod) -> Self {
        match value {
            CliIncomePeriod::Annual => IncomePeriod::Annual,
            CliIncomePeriod::Monthly => IncomePeriod::Monthly,
        }
    }
}

#[derive(Args, Debug)]
struct TaxArgs {
    /// Gross income for the chosen period
    #[arg(long)]
    income: f64,
    #[arg(long, value_enum, default_value_t = CliIncomePeriod::Annual)]
    period: CliIncomePeriod,
    /// Annual deductions subtracted before the brackets apply
    #[arg(long, default_value_t = 0.0)]
    deductions: f64,
}

pub async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => serve(args).await,
        Command::Project(args) => {
            let input: ProjectionInput = args.into();
            let result = project(&input)?;
            print_json(&build_projection_response(input, result))
        }
        Command::Tax(args) => {
            let input = TaxInput {
                income: args.income,
                period: args.period.into(),
                deductions: args.deductions,
            };
            print_json(&calculate_tax(&input, &TaxSchedule::israel_2025())?)
        }
    }
}

async fn serve(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;
    api::run_http_server(&config).await
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
