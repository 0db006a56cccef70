use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use sherpa_soap::http::MAX_ATTEMPTS;
use sherpa_soap::{ClientConfig, RetryPolicy, SoapClient, StaticAuth};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// sherpa-soap - call Sherpa SOAP services from the command line
///
/// Reads a complete SOAP envelope, posts it to the Sherpa endpoint and prints
/// the unwrapped response as JSON.
///
/// Examples:
///   sherpa-soap call GetStatus -e status.xml --base-url https://sherpa.example.com/Shop
///   cat stock.xml | sherpa-soap call ChangedStock
#[derive(Parser, Debug)]
#[command(author, version = env!("SHERPA_SOAP_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Call a SOAP service with an envelope read from a file or stdin
    Call(CallArgs),
}

#[derive(clap::Args, Debug)]
struct CallArgs {
    /// Service name, used for the SOAPAction header
    #[arg(value_name = "SERVICE")]
    service: String,

    /// File holding the SOAP envelope ("-" or absent reads stdin)
    #[arg(long, short = 'e', value_name = "FILE")]
    envelope: Option<PathBuf>,

    /// Base URL of the Sherpa service (the WSDL URL works too)
    #[arg(long, env = "SHERPA_BASE_URL", value_name = "URL")]
    base_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "SHERPA_TIMEOUT", value_name = "SECS", default_value_t = 300)]
    timeout: u64,

    /// Maximum number of attempts per call
    #[arg(long, value_name = "N", default_value_t = MAX_ATTEMPTS)]
    attempts: usize,

    /// Retry immediately instead of backing off
    #[arg(long)]
    no_backoff: bool,

    /// Print the endpoint and SOAPAction without sending anything
    #[arg(long)]
    dry_run: bool,
}

/// What a call would send, printed by `--dry-run`.
#[derive(Serialize, Debug)]
struct CallPlan {
    url: String,
    soap_action: String,
    timeout_secs: u64,
    max_attempts: usize,
}

impl CallArgs {
    fn config(&self) -> ClientConfig {
        let retry = if self.no_backoff {
            RetryPolicy::immediate(self.attempts)
        } else {
            RetryPolicy::default().with_max_attempts(self.attempts)
        };
        ClientConfig::new()
            .with_timeout(Duration::from_secs(self.timeout))
            .with_retry_policy(retry)
    }
}

fn read_envelope(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read envelope from {}", path.display())),
        _ => {
            let mut envelope = String::new();
            std::io::stdin()
                .read_to_string(&mut envelope)
                .context("Failed to read envelope from stdin")?;
            Ok(envelope)
        }
    }
}

async fn call(args: CallArgs) -> Result<()> {
    let config = args.config();
    let client = SoapClient::new(StaticAuth::new(&args.base_url), config)?;

    if args.dry_run {
        let plan = CallPlan {
            url: client.endpoint_url(),
            soap_action: client.config().soap_action(&args.service),
            timeout_secs: args.timeout,
            max_attempts: client.config().retry.attempts(),
        };
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let envelope = read_envelope(args.envelope.as_deref())?;
    let value = client
        .call_soap_service(&args.service, &envelope)
        .await
        .with_context(|| format!("Call to {} failed", args.service))?;

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Call(args) => call(args).await?,
    }
    Ok(())
}
