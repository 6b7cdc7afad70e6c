use clap::{Parser, Subcommand};
use esg_ranker::client::{CalculatorRequest, EsgClient};
use esg_ranker::config::Config;
use esg_ranker::equity::{load_equities, load_equities_json, EquityRecord};
use esg_ranker::error::Result;
use esg_ranker::profile::{BetaBand, RiskProfile};
use esg_ranker::ranker::rank_scored;
use esg_ranker::report::RankingReport;
use esg_ranker::sectors;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "esg-ranker")]
#[command(about = "Rank equities by ESG risk profile and query the calculator service")]
#[command(
    after_help = "Environment:\n  ESG_API_URL            Calculator service base URL\n  ESG_DATA_FILE          Equity table (CSV or .json)\n  ESG_HTTP_TIMEOUT_SECS  Request timeout\n  RUST_LOG               Log filter"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Top 5 equities for High-Risk, Balanced or Low-Risk (all three if omitted)
    Rank {
        profile: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Sector summaries, or the equities of one sector
    Sectors {
        sector: Option<String>,
    },
    /// Budget allocation from the calculator service
    Diversify {
        budget: f64,
        risk_tolerance: f64,
        max_companies: u32,
        min_value: f64,
        /// Use /sector-diversify with at least this many sectors
        min_sectors: Option<u32>,
    },
    /// Return on investment for a ticker
    Roi {
        ticker: String,
        years: u32,
    },
    /// Resolve a company name to its ticker
    Ticker {
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
}

fn load_table(config: &Config) -> Result<Vec<EquityRecord>> {
    let records = if config.data_file.ends_with(".json") {
        load_equities_json(&config.data_file)?
    } else {
        load_equities(&config.data_file)?
    };
    info!(file = %config.data_file, count = records.len(), "loaded equity table");
    Ok(records)
}

/// One report per requested profile. No label means every profile in
/// dashboard order; an unknown label gives a single empty report.
fn build_reports<'a>(records: &'a [EquityRecord], label: Option<&str>) -> Vec<RankingReport<'a>> {
    let profiles: Vec<Option<RiskProfile>> = match label {
        Some(label) => {
            let profile = RiskProfile::from_label(label);
            if profile.is_none() {
                warn!(%label, "unknown risk profile, nothing to rank");
            }
            vec![profile]
        }
        None => RiskProfile::ALL.iter().copied().map(Some).collect(),
    };

    profiles
        .into_iter()
        .map(|profile| RankingReport::new(profile, &rank_scored(records, profile)))
        .collect()
}

/// A single report prints as an object, several as an array.
fn render_json(reports: &[RankingReport<'_>]) -> Result<String> {
    let out = match reports {
        [single] => serde_json::to_string_pretty(single)?,
        many => serde_json::to_string_pretty(many)?,
    };
    Ok(out)
}

fn cmd_rank(config: &Config, profile: Option<&str>, json: bool) -> Result<()> {
    let records = load_table(config)?;
    let reports = build_reports(&records, profile);

    if json {
        println!("{}", render_json(&reports)?);
    } else {
        for report in &reports {
            if let Some(p) = report.profile {
                println!("{}", p.description());
            }
            println!("{}", report);
        }
    }
    Ok(())
}

fn cmd_sectors(config: &Config, sector: Option<&str>) -> Result<()> {
    let records = load_table(config)?;

    match sector {
        Some(sector) => {
            let members = sectors::in_sector(&records, sector);
            println!("{} ({} companies)", sector, members.len());
            for r in members {
                println!(
                    "  {:<8} ESG {:>6.1}  beta {:>5.2} ({})  cap {:.1}",
                    r.ticker,
                    r.esg_score,
                    r.beta,
                    BetaBand::classify(r.beta),
                    r.market_cap
                );
            }
        }
        None => {
            for s in sectors::summarize(&records) {
                println!("{:<28} companies {:>4}  avg ESG {:>6.2}", s.sector, s.companies, s.average_esg);
            }
        }
    }
    Ok(())
}

async fn cmd_diversify(config: &Config, request: CalculatorRequest) -> Result<()> {
    let client = EsgClient::new(config)?;
    let allocation = if request.min_sectors.is_some() {
        client.sector_diversify(&request).await?
    } else {
        client.diversify(&request).await?
    };

    println!("Expected return: {:.4}", allocation.expected_return);
    println!("Portfolio beta:  {:.4}", allocation.portfolio_beta);
    for (ticker, amount) in allocation.sorted_positions() {
        println!("  {:<8} ${:>12.2}", ticker, amount);
    }
    println!("  {:<8} ${:>12.2}", "TOTAL", allocation.total_allocated());
    Ok(())
}

async fn cmd_roi(config: &Config, ticker: &str, years: u32) -> Result<()> {
    let result = EsgClient::new(config)?.roi(ticker, years).await?;
    println!("{} over {} year(s): ROI {:.2}%, annualized {:.2}%", ticker, years, result.roi, result.annualized_roi);
    Ok(())
}

async fn cmd_ticker(config: &Config, name: &str) -> Result<()> {
    match EsgClient::new(config)?.lookup_ticker(name).await? {
        Some(ticker) => println!("{}", ticker),
        None => warn!(%name, "no ticker found"),
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;

    match cli.command {
        Command::Rank { profile, json } => cmd_rank(&config, profile.as_deref(), json),
        Command::Sectors { sector } => cmd_sectors(&config, sector.as_deref()),
        Command::Diversify { budget, risk_tolerance, max_companies, min_value, min_sectors } => {
            let request = CalculatorRequest {
                budget_dollars: budget,
                risk_tolerance,
                max_companies,
                min_value,
                min_sectors,
            };
            cmd_diversify(&config, request).await
        }
        Command::Roi { ticker, years } => cmd_roi(&config, &ticker, years).await,
        Command::Ticker { name } => cmd_ticker(&config, &name.join(" ")).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
