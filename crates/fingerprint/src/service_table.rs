//! Static port → service table
//!
//! Loaded once when an identifier is built and never changed afterwards.

use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use lookout_common::{LookoutError, LookoutResult, ServiceEntry};

/// Environment variable naming an external service table.
pub const SERVICES_DB_ENV: &str = "LOOKOUT_SERVICES_DB";

/// Table shipped with the tool, relative to the working directory.
pub const DEFAULT_SERVICES_DB: &str = "data/services.json";

const BUILTIN_SERVICES: &[(u16, &str, &str)] = &[
    (21, "FTP", "File Transfer Protocol"),
    (22, "SSH", "Secure Shell"),
    (23, "Telnet", "Telnet"),
    (25, "SMTP", "Simple Mail Transfer Protocol"),
    (53, "DNS", "Domain Name System"),
    (80, "HTTP", "Hypertext Transfer Protocol"),
    (110, "POP3", "Post Office Protocol v3"),
    (143, "IMAP", "Internet Message Access Protocol"),
    (443, "HTTPS", "HTTP Secure"),
    (3306, "MySQL", "MySQL Database"),
    (3389, "RDP", "Remote Desktop Protocol"),
    (5432, "PostgreSQL", "PostgreSQL Database"),
    (6379, "Redis", "Redis Database"),
    (8080, "HTTP-Proxy", "HTTP Alternate"),
    (8443, "HTTPS-Alt", "HTTPS Alternate"),
    (27017, "MongoDB", "MongoDB Database"),
];

static BUILTIN: Lazy<Arc<ServiceTable>> = Lazy::new(|| {
    let entries = BUILTIN_SERVICES
        .iter()
        .map(|&(port, name, description)| (port, ServiceEntry::new(name, description)))
        .collect();
    Arc::new(ServiceTable { entries })
});

#[derive(Debug, Clone, Default)]
pub struct ServiceTable {
    entries: HashMap<u16, ServiceEntry>,
}

impl ServiceTable {
    /// Shared built-in table of common ports.
    pub fn builtin() -> Arc<ServiceTable> {
        BUILTIN.clone()
    }

    /// Parse `{"<port>": {"service": .., "description": ..}, ..}`.
    pub fn from_json_str(json: &str) -> LookoutResult<Self> {
        let raw: BTreeMap<String, ServiceEntry> = serde_json::from_str(json)
            .map_err(|e| LookoutError::ServiceTable(format!("invalid service table: {}", e)))?;

        let mut entries = HashMap::with_capacity(raw.len());
        for (key, entry) in raw {
            let port = key
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|&p| p != 0)
                .ok_or_else(|| LookoutError::ServiceTable(format!("invalid port key '{}'", key)))?;
            entries.insert(port, entry);
        }
        Ok(Self { entries })
    }

    /// Read a table from disk.
    pub fn load(path: impl AsRef<Path>) -> LookoutResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let table = Self::from_json_str(&content)?;
        debug!("Loaded {} services from {}", table.len(), path.display());
        Ok(table)
    }

    /// Load from `path`, then `$LOOKOUT_SERVICES_DB`, then the shipped
    /// `data/services.json`; the built-in table is used when none is
    /// available or loading fails.
    pub fn load_or_builtin(path: Option<&Path>) -> Arc<ServiceTable> {
        let path: Option<PathBuf> = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(SERVICES_DB_ENV).map(PathBuf::from))
            .or_else(|| bundled_table(Path::new(".")));

        match path {
            Some(p) => match Self::load(&p) {
                Ok(table) => Arc::new(table),
                Err(e) => {
                    warn!("Using built-in service table; {} unusable: {}", p.display(), e);
                    Self::builtin()
                }
            },
            None => Self::builtin(),
        }
    }

    pub fn lookup(&self, port: u16) -> Option<&ServiceEntry> {
        self.entries.get(&port)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The shipped table under `base`, if present.
fn bundled_table(base: &Path) -> Option<PathBuf> {
    let candidate = base.join(DEFAULT_SERVICES_DB);
    candidate.is_file().then_some(candidate)
}

impl FromIterator<(u16, ServiceEntry)> for ServiceTable {
    fn from_iter<I: IntoIterator<Item = (u16, ServiceEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
