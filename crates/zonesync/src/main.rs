// # zonesync - registrar A record tool
//
// Thin integration layer over zonesync-core: reads configuration, asks for
// confirmation, and prints results. Fetch, reconcile, push and retry all
// live in the library.
//
// ## Commands
//
// - `zonesync set --domain dev.example.com [--ip 192.0.2.1] [--yes] [--dry-run]`
// - `zonesync show --domain example.com [--json]`
//
// ## Configuration
//
// Environment variables, optionally from a `.env` file in the working
// directory:
//
// - `NAMECHEAP_API_USER`, `NAMECHEAP_API_KEY`, `NAMECHEAP_USERNAME`,
//   `NAMECHEAP_CLIENT_IP`: account credentials (required)
// - `NAMECHEAP_API_URL`: endpoint (default: production)
// - `DEFAULT_TTL`: TTL for written records (default: 1800)
// - `DEFAULT_IP`: address used when `--ip` is omitted
// - `ZONESYNC_MAX_ATTEMPTS`: attempts per registrar call (default: 3)
// - `ZONESYNC_TIMEOUT_SECS`: per-attempt timeout (default: 30)
// - `ZONESYNC_RETRY_DELAY_SECS`: pause between attempts (default: 0)
// - `ZONESYNC_LOG`: log level (default: info)

mod cli;
mod settings;

use clap::Parser;
use cli::{Cli, Command};
use dialoguer::Confirm;
use settings::Settings;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;
use zonesync_core::{
    ChangeKind, Error, HostRecord, SubdomainPolicy, SyncEvent, SyncRequest, ZoneSync,
    parse_domain,
};

/// Exit codes for different termination scenarios
///
/// - 0: Success, or the user declined the change
/// - 1: Configuration or input error, nothing was sent
/// - 2: The registrar could not be read or written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ZonesyncExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<ZonesyncExitCode> for ExitCode {
    fn from(code: ZonesyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl From<&Error> for ZonesyncExitCode {
    fn from(err: &Error) -> Self {
        if err.is_input_error() {
            ZonesyncExitCode::ConfigError
        } else {
            ZonesyncExitCode::RuntimeError
        }
    }
}

fn main() -> ExitCode {
    // A missing .env file is fine; a malformed one is not
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        eprintln!("Failed to load .env file: {}", e);
        return ZonesyncExitCode::ConfigError.into();
    }

    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::from(cli.log))
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ZonesyncExitCode::ConfigError.into();
    }

    let settings = match Settings::from_env().and_then(|s| s.validate().map(|()| s)) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return ZonesyncExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ZonesyncExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match cli.command {
            Command::Set {
                domain,
                ip,
                yes,
                dry_run,
            } => run_set(&settings, &domain, ip, yes, dry_run).await,
            Command::Show { domain, json } => run_show(&settings, &domain, json).await,
        }
    });

    code.into()
}

/// Create or replace one A record
async fn run_set(
    settings: &Settings,
    domain: &str,
    ip: Option<String>,
    yes: bool,
    dry_run: bool,
) -> ZonesyncExitCode {
    let request = match build_request(settings, domain, ip, dry_run) {
        Ok(request) => request,
        Err(e) => {
            error!("{}", e);
            return ZonesyncExitCode::from(&e);
        }
    };

    info!(
        "Target: {} (zone {}) -> {}",
        request.target.fqdn(),
        request.target.zone,
        request.address
    );

    if !yes && !dry_run {
        match confirm(&request) {
            Ok(true) => {}
            Ok(false) => {
                info!("Aborted by user. No changes were made.");
                return ZonesyncExitCode::Success;
            }
            Err(e) => {
                error!("Could not read confirmation: {}", e);
                return ZonesyncExitCode::ConfigError;
            }
        }
    }

    let (sync, mut events) = match open_sync(settings) {
        Ok(pair) => pair,
        Err(e) => {
            error!("{}", e);
            return ZonesyncExitCode::from(&e);
        }
    };

    let result = sync.apply(&request).await;
    log_events(&mut events);

    match result {
        Ok(report) => {
            match &report.change {
                ChangeKind::Created => {
                    info!("Created A record {} -> {}", request.target.fqdn(), report.address)
                }
                ChangeKind::Updated { previous } => info!(
                    "Replaced A record {} ({}) -> {}",
                    request.target.fqdn(),
                    previous.join(", "),
                    report.address
                ),
            }
            if !report.pushed {
                info!("Dry run: no changes were made.");
            }
            ZonesyncExitCode::Success
        }
        Err(e) => {
            error!("Update failed: {}", e);
            ZonesyncExitCode::from(&e)
        }
    }
}

/// Print the live records of a zone
async fn run_show(settings: &Settings, domain: &str, json: bool) -> ZonesyncExitCode {
    let parsed = match parse_domain(domain, SubdomainPolicy::Optional) {
        Ok(parsed) => parsed,
        Err(e) => {
            error!("{}", e);
            return ZonesyncExitCode::from(&e);
        }
    };

    let (sync, mut events) = match open_sync(settings) {
        Ok(pair) => pair,
        Err(e) => {
            error!("{}", e);
            return ZonesyncExitCode::from(&e);
        }
    };

    info!("Fetching DNS records for {}", parsed.zone);
    let result = sync.inspect(&parsed.zone).await;
    log_events(&mut events);

    let records = match result {
        Ok(records) => records,
        Err(e) => {
            error!("Could not fetch records: {}", e);
            return ZonesyncExitCode::from(&e);
        }
    };

    if json {
        match serde_json::to_string_pretty(&records) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                error!("Failed to serialize records: {}", e);
                return ZonesyncExitCode::RuntimeError;
            }
        }
    } else {
        print!("{}", render_records(&records));
    }

    info!("Done. No changes were made.");
    ZonesyncExitCode::Success
}

fn build_request(
    settings: &Settings,
    domain: &str,
    ip: Option<String>,
    dry_run: bool,
) -> Result<SyncRequest, Error> {
    let target = parse_domain(domain, SubdomainPolicy::Required)?;

    let address = ip.or_else(|| settings.defaults.address.clone()).ok_or_else(|| {
        Error::config("no address given: pass --ip or set DEFAULT_IP")
    })?;

    Ok(SyncRequest::new(target, &address)?.with_dry_run(dry_run))
}

fn open_sync(settings: &Settings) -> Result<(ZoneSync, mpsc::Receiver<SyncEvent>), Error> {
    let client = zonesync_transport_http::registrar_client(&settings.registrar)?;
    ZoneSync::new(client, settings.defaults.clone())
}

fn confirm(request: &SyncRequest) -> dialoguer::Result<bool> {
    Confirm::new()
        .with_prompt(format!(
            "Point {} at {}? Every other record in {} is kept.",
            request.target.fqdn(),
            request.address,
            request.target.zone
        ))
        .default(false)
        .interact()
}

fn log_events(events: &mut mpsc::Receiver<SyncEvent>) {
    while let Ok(event) = events.try_recv() {
        debug!("Sync event: {:?}", event);
    }
}

/// Numbered, one record per line
fn render_records(records: &[HostRecord]) -> String {
    if records.is_empty() {
        return "No DNS records found.\n".to_string();
    }

    let mut out = format!("{} DNS record(s):\n", records.len());
    for (i, record) in records.iter().enumerate() {
        let mx_pref = record
            .mx_pref
            .map(|pref| pref.to_string())
            .unwrap_or_else(|| "-".to_string());
        let ttl = record
            .ttl
            .map(|ttl| ttl.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:>3}. {:<24} {:<6} {:<40} MXPref {:<4} TTL {}\n",
            i + 1,
            record.host_name,
            record.record_type.as_str(),
            record.address,
            mx_pref,
            ttl
        ));
    }
    out
}
