mod auth;
mod config;
mod dates;
mod loader;
mod skills;
mod submit;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Config, CredentialSource, ProjectSource};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "diary-sync")]
#[command(about = "Submit project diary entries from a CSV/Excel file to the internship portal")]
struct Cli {
    /// Portal login email (falls back to [credentials] in the config file)
    #[arg(long)]
    email: Option<String>,

    /// Portal login password
    #[arg(long)]
    password: Option<String>,

    /// Path to the Excel/CSV diary file
    #[arg(long)]
    file: PathBuf,

    /// Project id to file entries under (looked up from the portal when omitted)
    #[arg(long)]
    project_id: Option<String>,

    /// Config file (default: ~/.diary-sync/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pause between store requests in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(delay_ms) = cli.delay_ms {
        config.submit.delay_ms = delay_ms;
    }

    run(&config, cli)
}

fn run(config: &Config, cli: Cli) -> Result<()> {
    let (credentials, credential_source) = config.credentials(cli.email, cli.password)?;
    let project_source = config.project_source(cli.project_id);

    let rows = loader::load_rows(&cli.file)?;
    if rows.is_empty() {
        println!("No entries found in {}.", cli.file.display());
        return Ok(());
    }
    println!("Successfully loaded {} entries.", rows.len());

    if credential_source == CredentialSource::Static {
        log::info!("Using credentials from config file");
    }
    if let ProjectSource::AutoResolve = project_source {
        log::info!("No project id given, will look it up after login");
    }

    let (client, jar) = auth::build_client(config.submit.timeout())?;

    println!("Logging in...");
    let session = auth::login(client, &jar, &config.endpoints, &credentials)
        .context("Authentication failed")?
        .into_session(&config.endpoints, project_source)
        .context("Could not determine project id")?;
    match session.auth() {
        auth::AuthMethod::Bearer(_) => println!("Authentication successful (bearer token)."),
        auth::AuthMethod::Cookies => println!("Authentication successful (session cookie)."),
        auth::AuthMethod::Anonymous => println!("Logged in without a token or session cookie."),
    }

    let catalog = config.skill_catalog();
    log::debug!("{} skills in catalog", catalog.len());
    let mut submitter = submit::Submitter::new(
        &session,
        &config.endpoints.store,
        &catalog,
        config.submit.mood,
        config.submit.delay(),
    );
    let summary = submitter.submit_all(&rows);

    println!("{}", summary);
    Ok(())
}
