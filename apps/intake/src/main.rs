mod config;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use intake::fields::{requires_poid, DEFAULT_PROVIDERS};
use intake::render::TerminalView;
use intake::{
    HttpIntakeClient, IntakeError, IntakeForm, Mode, PoidField, SelectedFile,
    SubmissionController, UploadController, ValidationError,
};

use crate::config::{parse_base_url, Config};

/// Exit code for input rejected before anything was sent.
const EXIT_INVALID_INPUT: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "intake", version, about = "Submit a utility bill for intake processing")]
struct Cli {
    /// Backend base URL (overrides INTAKE_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Use the sandbox endpoints (overrides INTAKE_MODE)
    #[arg(long, global = true)]
    sandbox: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a bill without sending it
    Check {
        /// Bill to validate (PDF, JPG or PNG, at most 16MB)
        file: PathBuf,
    },

    /// Show whether a utility provider requires a Point of Delivery ID
    Poid {
        /// Provider name exactly as listed, e.g. "NYSEG"
        provider: String,
    },

    /// Submit a bill with account details and follow processing to the end
    Submit(SubmitArgs),
}

#[derive(Args, Debug)]
struct SubmitArgs {
    /// Utility bill to upload
    file: PathBuf,

    #[arg(long)]
    provider: String,

    /// Point of Delivery ID (required for NYSEG and RG&E)
    #[arg(long, default_value = "")]
    poid: String,

    #[arg(long, default_value = "")]
    business_entity: String,

    #[arg(long, default_value = "")]
    account_name: String,

    #[arg(long, default_value = "")]
    contact_name: String,

    #[arg(long, default_value = "")]
    title: String,

    #[arg(long, default_value = "")]
    phone: String,

    #[arg(long, default_value = "")]
    email: String,

    #[arg(long, default_value = "")]
    service_addresses: String,

    #[arg(long = "developer", default_value = "")]
    developer_assigned: String,

    #[arg(long, default_value = "")]
    account_type: String,

    #[arg(long, default_value = "")]
    agent_id: String,

    /// Accept the power-of-attorney agreement
    #[arg(long)]
    accept_poa: bool,

    /// Poll interval in milliseconds (overrides INTAKE_POLL_INTERVAL_MS)
    #[arg(long)]
    poll_interval_ms: Option<u64>,
}

impl SubmitArgs {
    fn to_form(&self) -> IntakeForm {
        IntakeForm {
            business_entity: self.business_entity.clone(),
            account_name: self.account_name.clone(),
            contact_name: self.contact_name.clone(),
            title: self.title.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            service_addresses: self.service_addresses.clone(),
            developer_assigned: self.developer_assigned.clone(),
            account_type: self.account_type.clone(),
            utility_provider: self.provider.clone(),
            poid: self.poid.clone(),
            agent_id: self.agent_id.clone(),
            poa_agreement: self.accept_poa,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration first
    let mut config = Config::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = parse_base_url(base_url)?;
    }
    if cli.sandbox {
        config.mode = Mode::Sandbox;
    }

    // Initialize structured logging; stdout is reserved for the rendered UI
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!("Intake client v{} ({:?})", env!("CARGO_PKG_VERSION"), config);

    match cli.command {
        Commands::Check { file } => check(&file).await,
        Commands::Poid { provider } => {
            poid(&provider);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Submit(args) => submit(&config, &args).await,
    }
}

async fn check(path: &Path) -> Result<ExitCode> {
    let file = SelectedFile::from_path(path)
        .await
        .with_context(|| format!("Cannot open {}", path.display()))?;

    let mut upload = UploadController::default();
    let info = upload.select(file);
    println!("{info}");

    Ok(if info.is_ready() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_INVALID_INPUT)
    })
}

fn poid(provider: &str) {
    let field = PoidField::for_provider(provider);
    println!("{provider}: {}", field.hint);
    if !requires_poid(provider) && !DEFAULT_PROVIDERS.contains(&provider) {
        println!("(known providers: {})", DEFAULT_PROVIDERS.join(", "));
    }
}

async fn submit(config: &Config, args: &SubmitArgs) -> Result<ExitCode> {
    let file = SelectedFile::from_path(&args.file)
        .await
        .with_context(|| format!("Cannot open {}", args.file.display()))?;

    let mut upload = UploadController::default();
    println!("{}", upload.select(file));

    let form = args.to_form();

    let poll_interval = args
        .poll_interval_ms
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .unwrap_or(config.poll_interval);

    let client = HttpIntakeClient::new(config.base_url.clone(), config.mode, config.request_timeout)
        .context("Failed to build HTTP client")?;
    info!("Using {} endpoints at {}", config.mode, config.base_url);

    let mut controller =
        SubmissionController::new(client, config.mode).with_poll_interval(poll_interval);
    let mut view = TerminalView::new(std::io::stdout());

    match controller.submit(&form, &upload, &mut view).await {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(IntakeError::Validation(e)) => {
            if let Some(line) = validation_line(&e) {
                eprintln!("{line}");
            }
            Ok(ExitCode::from(EXIT_INVALID_INPUT))
        }
        Err(e) => {
            debug!("Submission ended with error: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// File rejections already appear on the info line, so only form problems get their own.
fn validation_line(e: &ValidationError) -> Option<String> {
    match e {
        ValidationError::TooLarge { .. } | ValidationError::InvalidType { .. } => None,
        other => Some(format!("❌ {other}")),
    }
}
