//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

use crate::adapters::console_report_adapter::ConsoleReportAdapter;
use crate::adapters::csv_adapter::CsvHistoryAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{
    DATA_SECTION, DEFAULT_SPENDING_PERCENTAGE, SIMULATION_SECTION, validate_num_years,
    validate_simulation_config, validate_spending_percentage, validate_starting_cash,
};
use crate::domain::error::RetireSimError;
use crate::domain::simulation::{
    DEFAULT_NUM_YEARS, DEFAULT_STARTING_CASH, SimulationConfig, SimulationOutcome,
    available_start_years, run_simulations,
};
use crate::domain::strategy::{BuyAndHoldStrategy, WithdrawalMode, WithdrawalPolicy};
use crate::logging;
use crate::ports::config_port::ConfigPort;
use crate::ports::history_port::HistoryPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_PRICES_PATH: &str = "snp_history.csv";
pub const DEFAULT_INFLATION_PATH: &str = "inflation_history.csv";

#[derive(Parser, Debug)]
#[command(
    name = "retiresim",
    about = "Backtest retirement withdrawal strategies against market history"
)]
pub struct Cli {
    /// Log every simulated year
    #[arg(short, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand. Each one overrides the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct SettingsArgs {
    /// INI file with [simulation] and [data] sections
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Percent of the portfolio withdrawn per year (default 4)
    #[arg(long, global = true)]
    pub spending_percentage: Option<f64>,

    /// Withdraw an inflation-adjusted fixed amount each year (default)
    #[arg(long, global = true, overrides_with = "no_spend_fixed_real_amount")]
    pub spend_fixed_real_amount: bool,

    /// Withdraw a fixed percentage of the current portfolio each year
    #[arg(long, global = true, overrides_with = "spend_fixed_real_amount")]
    pub no_spend_fixed_real_amount: bool,

    /// Cash each simulation starts with (default 1000000)
    #[arg(long, global = true)]
    pub starting_cash: Option<f64>,

    /// Daily index price history CSV
    #[arg(long, global = true)]
    pub prices: Option<PathBuf>,

    /// Monthly inflation history CSV
    #[arg(long, global = true)]
    pub inflation: Option<PathBuf>,
}

impl SettingsArgs {
    fn spend_fixed_real_amount(&self) -> Option<bool> {
        if self.no_spend_fixed_real_amount {
            Some(false)
        } else if self.spend_fixed_real_amount {
            Some(true)
        } else {
            None
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Simulate buy-and-hold from every start year with enough history
    SimBuyAndHold {
        /// Years each simulation runs for. Longer horizons leave fewer start
        /// years in the available history.
        #[arg(long)]
        num_years: Option<u32>,

        /// Only simulate the run starting in this year
        #[arg(long)]
        only_year: Option<i32>,

        /// Base filename (no extension) for tab-delimited debug CSV files
        #[arg(long)]
        output_csv_prefix: Option<String>,
    },
    /// Validate the configuration without loading history
    Validate,
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub policy: WithdrawalPolicy,
    pub simulation: SimulationConfig,
    pub prices_path: PathBuf,
    pub inflation_path: PathBuf,
}

pub fn run(cli: Cli) -> ExitCode {
    logging::init(cli.verbose);

    let result = match cli.command {
        Command::SimBuyAndHold {
            num_years,
            only_year,
            output_csv_prefix,
        } => run_sim_buy_and_hold(
            &cli.settings,
            num_years,
            only_year,
            output_csv_prefix.as_deref(),
        ),
        Command::Validate => run_validate(&cli.settings),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, RetireSimError> {
    match path {
        Some(p) => {
            info!("loading config from {}", p.display());
            FileConfigAdapter::from_file(p)
        }
        None => FileConfigAdapter::from_string(""),
    }
}

/// Merge config-file values, command-line overrides and defaults, then
/// validate the result.
pub fn build_run_settings(
    config: &dyn ConfigPort,
    args: &SettingsArgs,
    num_years: Option<u32>,
) -> Result<RunSettings, RetireSimError> {
    validate_simulation_config(config)?;

    let spending_percentage = args.spending_percentage.unwrap_or_else(|| {
        config.get_double(
            SIMULATION_SECTION,
            "spending_percentage",
            DEFAULT_SPENDING_PERCENTAGE,
        )
    });
    validate_spending_percentage(spending_percentage)?;

    let fixed_real = args
        .spend_fixed_real_amount()
        .unwrap_or_else(|| config.get_bool(SIMULATION_SECTION, "spend_fixed_real_amount", true));

    let starting_cash = args.starting_cash.unwrap_or_else(|| {
        config.get_double(SIMULATION_SECTION, "starting_cash", DEFAULT_STARTING_CASH)
    });
    validate_starting_cash(starting_cash)?;

    let num_years = match num_years {
        Some(n) => i64::from(n),
        None => config.get_int(SIMULATION_SECTION, "num_years", DEFAULT_NUM_YEARS as i64),
    };
    validate_num_years(num_years)?;

    let prices_path = args
        .prices
        .clone()
        .or_else(|| config.get_path(DATA_SECTION, "prices"))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PRICES_PATH));
    let inflation_path = args
        .inflation
        .clone()
        .or_else(|| config.get_path(DATA_SECTION, "inflation"))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INFLATION_PATH));

    Ok(RunSettings {
        policy: WithdrawalPolicy {
            spending_percentage: spending_percentage / 100.0,
            mode: if fixed_real {
                WithdrawalMode::FixedReal
            } else {
                WithdrawalMode::PercentOfPortfolio
            },
        },
        simulation: SimulationConfig {
            starting_cash,
            num_years: num_years as u32,
        },
        prices_path,
        inflation_path,
    })
}

fn run_sim_buy_and_hold(
    args: &SettingsArgs,
    num_years: Option<u32>,
    only_year: Option<i32>,
    output_csv_prefix: Option<&str>,
) -> Result<(), RetireSimError> {
    let config = load_config(args.config.as_deref())?;
    let settings = build_run_settings(&config, args, num_years)?;

    let history = CsvHistoryAdapter::new(
        settings.prices_path.clone(),
        settings.inflation_path.clone(),
    );
    let console = ConsoleReportAdapter::stdout();
    let csv_report = output_csv_prefix.map(CsvReportAdapter::new);

    let mut reports: Vec<&dyn ReportPort> = vec![&console];
    if let Some(csv_report) = csv_report.as_ref() {
        reports.push(csv_report);
    }

    run_sim_buy_and_hold_pipeline(&history, &settings, only_year, &reports)?;
    Ok(())
}

/// Load history, simulate every requested start year and feed each report.
///
/// Without `only_year`, every start year with a full horizon of history is
/// simulated.
pub fn run_sim_buy_and_hold_pipeline(
    history: &dyn HistoryPort,
    settings: &RunSettings,
    only_year: Option<i32>,
    reports: &[&dyn ReportPort],
) -> Result<Vec<SimulationOutcome>, RetireSimError> {
    let data = history.load_all()?;

    let start_years = match only_year {
        Some(year) => vec![year],
        None => available_start_years(&data, settings.simulation.num_years),
    };
    if start_years.is_empty() {
        return Err(RetireSimError::ConfigInvalid {
            section: SIMULATION_SECTION.to_string(),
            key: "num_years".to_string(),
            reason: format!(
                "no start year has {} years of history",
                settings.simulation.num_years
            ),
        });
    }

    info!(
        "simulating {} start years, {} years each, spending {:.2}% ({:?})",
        start_years.len(),
        settings.simulation.num_years,
        settings.policy.spending_percentage * 100.0,
        settings.policy.mode
    );

    let policy = settings.policy;
    let runs = run_simulations(
        || BuyAndHoldStrategy::new(policy),
        &data,
        &settings.simulation,
        &start_years,
    )?;

    let outcomes: Vec<SimulationOutcome> = runs.iter().map(|r| r.outcome.clone()).collect();
    for report in reports {
        for run in &runs {
            report.write_trace(run.outcome.start_year, &run.trace)?;
        }
        report.write_summary(&outcomes)?;
        report.write_inflation(&data.inflation)?;
        report.write_prices(&data.prices)?;
    }

    Ok(outcomes)
}

fn run_validate(args: &SettingsArgs) -> Result<(), RetireSimError> {
    let config = load_config(args.config.as_deref())?;
    let settings = build_run_settings(&config, args, None)?;

    println!(
        "spending:      {:.2}% ({})",
        settings.policy.spending_percentage * 100.0,
        match settings.policy.mode {
            WithdrawalMode::FixedReal => "inflation-adjusted fixed amount",
            WithdrawalMode::PercentOfPortfolio => "percentage of portfolio",
        }
    );
    println!("starting cash: {}", settings.simulation.starting_cash);
    println!("num years:     {}", settings.simulation.num_years);
    println!("prices:        {}", settings.prices_path.display());
    println!("inflation:     {}", settings.inflation_path.display());
    println!("Configuration is valid.");
    Ok(())
}
