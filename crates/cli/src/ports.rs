//! Port specification parsing

use anyhow::{anyhow, bail, Context, Result};
use std::collections::BTreeSet;

/// Parse "80,443,1000-1010" into an ascending, duplicate-free port list.
/// Reversed ranges ("100-1") are accepted and swapped.
pub fn parse_ports(spec: &str) -> Result<Vec<u16>> {
    let mut ports = BTreeSet::new();

    for part in spec.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some((a, b)) = part.split_once('-') {
            let start = parse_port(a).with_context(|| format!("Invalid port range: {}", part))?;
            let end = parse_port(b).with_context(|| format!("Invalid port range: {}", part))?;
            let (start, end) = if start > end { (end, start) } else { (start, end) };
            ports.extend(start..=end);
        } else {
            ports.insert(parse_port(part)?);
        }
    }

    if ports.is_empty() {
        Err(anyhow!("No valid ports to scan"))
    } else {
        Ok(ports.into_iter().collect())
    }
}

fn parse_port(s: &str) -> Result<u16> {
    let s = s.trim();
    let val: u32 = s.parse().with_context(|| format!("Invalid port: '{}'", s))?;
    if !(1..=65535).contains(&val) {
        bail!("Ports must be between 1 and 65535, got {}", val);
    }
    Ok(val as u16)
}
