//! Report rendering and saving for scan results

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use csv::Writer;
use serde_json::{json, Value};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lookout_common::{ScanResult, ServiceRecord};

/// Characters of banner shown in the text report.
const BANNER_PREVIEW_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Json,
    Csv,
}

/// Print the report to stdout in the requested format.
pub fn print_report(scan: &ScanResult, services: Option<&[ServiceRecord]>, format: &str) -> Result<()> {
    let format = format.trim().to_lowercase();
    match format.as_str() {
        "json" | "j" => println!("{}", render_json(scan, services)?),
        "csv" | "c" => print!("{}", render_csv(scan, services)?),
        "text" | "table" | "t" | "" => print!("{}", format_report(scan, services)),
        _ => {
            eprintln!("Warning: Unknown format '{}', using text", format);
            print!("{}", format_report(scan, services));
        }
    }
    Ok(())
}

/// Human-readable summary.
pub fn format_report(scan: &ScanResult, services: Option<&[ServiceRecord]>) -> String {
    let mut out = String::new();
    let rule = format!("{:=<60}", "");

    let _ = writeln!(out, "\n{}", rule);
    let _ = writeln!(out, "Scan Results for {}", scan.target);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Address:      {}", scan.address);
    let _ = writeln!(out, "Start Time:   {}", local_time(scan.start_time));
    let _ = writeln!(out, "End Time:     {}", local_time(scan.end_time));
    let _ = writeln!(out, "Duration:     {}", format_duration(scan.duration));
    let _ = writeln!(out, "Ports Scanned: {}", scan.total_ports_scanned);
    let _ = writeln!(out, "Open Ports:   {}", scan.open_ports.len());

    if scan.open_ports.is_empty() {
        let _ = writeln!(out, "\nNo open ports found.");
    } else if let Some(services) = services {
        let _ = writeln!(out, "\nDetected Services:");
        let _ = writeln!(out, "{:-<60}", "");
        for rec in services {
            let _ = writeln!(out, "Port {}/tcp: {}", rec.port, rec.name);
            if !rec.description.is_empty() {
                let _ = writeln!(out, "  Description: {}", rec.description);
            }
            if let Some(banner) = &rec.banner {
                let _ = writeln!(out, "  Banner: {}", preview(banner, BANNER_PREVIEW_CHARS));
            }
        }
    } else {
        let _ = writeln!(out, "\nOpen Ports:");
        for port in &scan.open_ports {
            let _ = writeln!(out, "  [+] Port {}/tcp open", port);
        }
    }
    let _ = writeln!(out, "{}", rule);
    out
}

/// `{"scan_info": {..}, "services": [..]}`
pub fn render_json(scan: &ScanResult, services: Option<&[ServiceRecord]>) -> Result<String> {
    let detected = services.is_some();
    let services: Vec<Value> = match services {
        Some(records) => records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<_, _>>()?,
        None => scan.open_ports.iter().map(|p| json!({ "port": p })).collect(),
    };

    let output = json!({
        "scan_info": {
            "scan_id": scan.scan_id.to_string(),
            "target": scan.target,
            "address": scan.address.to_string(),
            "start_time": local_time(scan.start_time),
            "end_time": local_time(scan.end_time),
            "duration_seconds": scan.duration.as_secs_f64(),
            "duration_formatted": format_duration(scan.duration),
            "total_ports_scanned": scan.total_ports_scanned,
            "open_ports": scan.open_ports,
            "service_detection": detected,
        },
        "services": services,
    });

    Ok(serde_json::to_string_pretty(&output)?)
}

/// CSV with one row per open port.
pub fn render_csv(scan: &ScanResult, services: Option<&[ServiceRecord]>) -> Result<String> {
    let mut wtr = Writer::from_writer(vec![]);
    match services {
        Some(records) => {
            wtr.write_record(["port", "service", "description", "banner"])?;
            for rec in records {
                wtr.write_record([
                    rec.port.to_string().as_str(),
                    rec.name.as_str(),
                    rec.description.as_str(),
                    rec.banner.as_deref().unwrap_or(""),
                ])?;
            }
        }
        None => {
            wtr.write_record(["Port"])?;
            for port in &scan.open_ports {
                wtr.write_record([port.to_string()])?;
            }
        }
    }

    let data = wtr.into_inner()?;
    Ok(String::from_utf8(data)?)
}

/// Write results to `path` and return the path actually written.
pub fn save_results(path: &Path, scan: &ScanResult, services: Option<&[ServiceRecord]>) -> Result<PathBuf> {
    let (path, format) = output_target(path);

    let body = match format {
        FileFormat::Json => render_json(scan, services)?,
        FileFormat::Csv => render_csv(scan, services)?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Anything that is not .json or .csv gets `.json` appended.
fn output_target(path: &Path) -> (PathBuf, FileFormat) {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("json") => (path.to_path_buf(), FileFormat::Json),
        Some("csv") => (path.to_path_buf(), FileFormat::Csv),
        _ => {
            let mut name = path.as_os_str().to_os_string();
            name.push(".json");
            (PathBuf::from(name), FileFormat::Json)
        }
    }
}

/// First `max` characters of a banner on one line.
fn preview(banner: &str, max: usize) -> String {
    let flat: String = banner
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect();
    if flat.chars().count() > max {
        let cut: String = flat.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        flat
    }
}

fn local_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format duration in a human-readable way
fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs == 0 {
        format!("{}ms", millis)
    } else if total_secs < 60 {
        if millis > 0 {
            format!("{}.{:03}s", total_secs, millis)
        } else {
            format!("{}s", total_secs)
        }
    } else {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        if secs > 0 {
            format!("{}m {}s", mins, secs)
        } else {
            format!("{}m", mins)
        }
    }
}
