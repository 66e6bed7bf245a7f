use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};

use super::{
    ApiError, ApiResult, CliStrategy, build_comparison_response, build_payoff_response,
    build_request, payload_from_json,
};

#[derive(Parser, Debug)]
#[command(
    name = "payoff",
    about = "Multi-debt payoff simulator (avalanche or snowball, with extra payments and rollover)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API over HTTP.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Simulate a payload file and print the JSON result.
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[arg(long, help = "Payload JSON file, or - for stdin")]
    pub input: PathBuf,
    #[arg(long, value_enum, help = "Overrides the payload strategy")]
    pub strategy: Option<CliStrategy>,
    #[arg(
        long,
        help = "Roll paid-off minimums into the extra pool (overrides the payload)"
    )]
    pub fixed_total: Option<bool>,
    #[arg(long, help = "Simulation start date, YYYY-MM-DD; defaults to today")]
    pub start_date: Option<NaiveDate>,
    #[arg(long, help = "Compare avalanche against snowball")]
    pub compare: bool,
}

fn read_input(path: &Path) -> ApiResult<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    Ok(fs::read_to_string(path)?)
}

/// Runs one simulation from a payload file and renders the response as
/// pretty JSON.
pub fn execute_run(args: &RunArgs) -> ApiResult<String> {
    let json = read_input(&args.input)?;
    render_run(args, &json, Local::now().date_naive())
}

fn render_run(args: &RunArgs, json: &str, today: NaiveDate) -> ApiResult<String> {
    let mut request = build_request(payload_from_json(json)?, today)?;
    if let Some(strategy) = args.strategy {
        request.strategy = strategy.into();
    }
    if let Some(fixed_total) = args.fixed_total {
        request.fixed_total = fixed_total;
    }
    if let Some(start) = args.start_date {
        request.start = start;
    }

    let rendered = if args.compare {
        serde_json::to_string_pretty(&build_comparison_response(&request))
    } else {
        serde_json::to_string_pretty(&build_payoff_response(&request))
    };
    rendered.map_err(ApiError::from)
}
