//! Paie CLI
//!
//! Command-line access to the persistence gateway. Every command prints the
//! operation outcome as JSON and exits non-zero when it failed.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use paie::clients::{AuthClient, PostgrestClient};
use paie::core::config::AppConfig;
use paie::core::models::{CalculationInput, CompanyInput, EmployeeInput};
use paie::core::session::SessionProvider;
use paie::{Outcome, PersistenceGateway};

#[derive(Debug, Parser)]
#[command(name = "paie")]
#[command(about = "Paie - payroll data gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign in and print an access token for SUPABASE_ACCESS_TOKEN
    Login(LoginArgs),
    #[command(flatten)]
    Data(DataCommand),
}

/// Commands that run against the gateway with the current session.
#[derive(Debug, Subcommand)]
enum DataCommand {
    /// Employee records
    #[command(subcommand)]
    Employees(EmployeeCommand),
    /// Company profile
    #[command(subcommand)]
    Company(CompanyCommand),
    /// Salary calculations
    #[command(subcommand)]
    Calculations(CalculationCommand),
    /// Export every record owned by the signed-in user
    Export(ExportArgs),
}

#[derive(Debug, Args)]
struct LoginArgs {
    #[arg(long)]
    email: String,

    #[arg(long, env = "PAIE_PASSWORD")]
    password: String,
}

#[derive(Debug, Subcommand)]
enum EmployeeCommand {
    List,
    /// Create an employee, or update one with --id
    Save {
        /// JSON file holding the employee fields
        #[arg(short, long)]
        file: PathBuf,
        #[arg(long)]
        id: Option<Uuid>,
    },
    Delete { id: Uuid },
}

#[derive(Debug, Subcommand)]
enum CompanyCommand {
    Show,
    /// Create or update the company profile
    Save {
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
enum CalculationCommand {
    List {
        /// Only calculations linked to this employee
        #[arg(long)]
        employee: Option<Uuid>,
    },
    Save {
        /// JSON file with `input`, `result` and optional `title`/`period`
        #[arg(short, long)]
        file: PathBuf,
        #[arg(long)]
        employee: Option<Uuid>,
    },
    Delete { id: Uuid },
}

#[derive(Debug, Args)]
struct ExportArgs {
    /// Write the snapshot to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn emit<T: Serialize>(outcome: &Outcome<T>, key: Option<&str>) -> Result<bool> {
    println!("{}", serde_json::to_string_pretty(&outcome.to_json(key))?);
    Ok(outcome.is_ok())
}

async fn login(config: &AppConfig, args: LoginArgs) -> Result<bool> {
    let auth = AuthClient::new(config)?;
    let session = auth.sign_in_with_password(&args.email, &args.password).await?;
    let user = session.require_user()?;
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "ok": true,
            "user_id": user.id,
            "access_token": user.access_token,
        }))?
    );
    Ok(true)
}

async fn run(cli: Cli) -> Result<bool> {
    let config = AppConfig::from_env()?;
    match cli.command {
        Commands::Login(args) => login(&config, args).await,
        Commands::Data(command) => run_data(&config, command).await,
    }
}

async fn run_data(config: &AppConfig, command: DataCommand) -> Result<bool> {
    let session = AuthClient::new(config)?.current_session().await?;
    let gateway = PersistenceGateway::new(PostgrestClient::new(config)?);

    match command {
        DataCommand::Employees(EmployeeCommand::List) => {
            emit(&gateway.get_employees(&session).await, Some("employees"))
        }
        DataCommand::Employees(EmployeeCommand::Save { file, id }) => {
            let input: EmployeeInput = read_json(&file)?;
            emit(
                &gateway.save_employee(&session, input, id).await,
                Some("employee"),
            )
        }
        DataCommand::Employees(EmployeeCommand::Delete { id }) => {
            emit(&gateway.delete_employee(&session, id).await, None)
        }
        DataCommand::Company(CompanyCommand::Show) => {
            emit(&gateway.get_company(&session).await, Some("company"))
        }
        DataCommand::Company(CompanyCommand::Save { file }) => {
            let input: CompanyInput = read_json(&file)?;
            emit(&gateway.save_company(&session, input).await, Some("company"))
        }
        DataCommand::Calculations(CalculationCommand::List { employee }) => emit(
            &gateway.get_calculations(&session, employee).await,
            Some("calculations"),
        ),
        DataCommand::Calculations(CalculationCommand::Save { file, employee }) => {
            let input: CalculationInput = read_json(&file)?;
            emit(
                &gateway.save_calculation(&session, input, employee).await,
                Some("calculation"),
            )
        }
        DataCommand::Calculations(CalculationCommand::Delete { id }) => {
            emit(&gateway.delete_calculation(&session, id).await, None)
        }
        DataCommand::Export(args) => {
            let outcome = gateway.export_user_data(&session).await;
            match (&args.output, outcome.payload()) {
                (Some(path), Some(snapshot)) => {
                    std::fs::write(path, serde_json::to_vec_pretty(snapshot)?)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!(
                        "{}",
                        json!({ "ok": true, "output": path.display().to_string() })
                    );
                    Ok(true)
                }
                _ => emit(&outcome, Some("snapshot")),
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    paie::setup_logging();

    match run(Cli::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("Command failed: {:#}", e);
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
