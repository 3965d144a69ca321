// runner.rs
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use lookout_common::{LookoutError, ScanResult, ServiceRecord};
use lookout_fingerprint::{ServiceIdentifier, ServiceTable};
use lookout_orchestrator::{CancellationToken, Orchestrator};
use lookout_scanner_tcp::{BannerGrabber, TcpScanner};
use lookout_target_resolver::TargetResolver;

use crate::args::ScanArgs;
use crate::output::{print_report, save_results};
use crate::ports::parse_ports;

/// Everything a finished run produces.
#[derive(Debug)]
pub struct ScanReport {
    pub scan: ScanResult,
    /// `None` when service detection was not requested or nothing was open.
    pub services: Option<Vec<ServiceRecord>>,
}

pub async fn run_scan(args: ScanArgs) -> Result<()> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let report = match execute(&args, cancel).await? {
        Some(report) => report,
        None => {
            println!("\n[!] Scan interrupted by user");
            return Ok(());
        }
    };

    print_report(&report.scan, report.services.as_deref(), &args.format)?;

    if let Some(path) = &args.output {
        let written = save_results(path, &report.scan, report.services.as_deref())?;
        println!("[+] Results saved to: {}", written.display());
    }

    Ok(())
}

/// Run the connect scan and, when asked, service detection.
/// Returns `Ok(None)` if `cancel` fires before the run completes.
pub async fn execute(args: &ScanArgs, cancel: CancellationToken) -> Result<Option<ScanReport>> {
    let options = args.options()?;
    let port_list = parse_ports(&args.ports)?;

    let address = TargetResolver::resolve(&args.target).await?;
    info!("Starting scan...");
    if TargetResolver::is_ip_literal(&args.target) {
        info!("Target: {}", address);
    } else {
        info!("Target: {} ({})", args.target, address);
    }
    info!("Ports: {} port(s)", port_list.len());
    info!(
        "Workers: {}, timeout: {:?}",
        options.workers, options.timeout
    );

    let request = options.request(address.to_string(), &port_list)?;

    let orchestrator = Orchestrator::new(Arc::new(TcpScanner::new()))
        .with_cancellation(cancel);

    let mut scan = match orchestrator.scan(request).await {
        Ok(scan) => scan,
        Err(LookoutError::Cancelled) => {
            warn!("Scan cancelled");
            return Ok(None);
        }
        Err(e) => return Err(e).context("Scan failed"),
    };
    // report the name the user typed, not the resolved address
    scan.target = args.target.clone();

    if !options.service_detection || scan.open_ports.is_empty() {
        return Ok(Some(ScanReport { scan, services: None }));
    }

    let table = ServiceTable::load_or_builtin(options.services_db.as_deref());
    let identifier = ServiceIdentifier::new(
        table,
        Arc::new(BannerGrabber::new(options.banner_timeout)),
    )
    .with_concurrency(options.identify_concurrency);
    info!("Service table: {} entries", identifier.table().len());

    let cancel = orchestrator.cancellation_token();
    let services = tokio::select! {
        _ = cancel.cancelled() => {
            warn!("Service detection cancelled");
            return Ok(None);
        }
        records = identifier.identify(scan.address, &scan.open_ports) => records,
    };

    Ok(Some(ScanReport {
        scan,
        services: Some(services),
    }))
}
