//! Per-port service identification: table lookup, then banner reclassification.

use futures::stream::{self, StreamExt};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use lookout_common::{BannerProbe, ServiceRecord, Target};
use crate::service_detector::classify_banner;
use crate::service_table::ServiceTable;

pub struct ServiceIdentifier {
    table: Arc<ServiceTable>,
    banners: Arc<dyn BannerProbe>,
    concurrency: usize,
}

impl ServiceIdentifier {
    /// Identifier that probes one port at a time.
    pub fn new(table: Arc<ServiceTable>, banners: Arc<dyn BannerProbe>) -> Self {
        Self {
            table,
            banners,
            concurrency: 1,
        }
    }

    /// Allow up to `concurrency` banner probes in flight (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn table(&self) -> &ServiceTable {
        &self.table
    }

    /// Identify a single port. Never fails; a missing banner just leaves
    /// the table-derived name in place.
    pub async fn identify_port(&self, ip: IpAddr, port: u16) -> ServiceRecord {
        let mut record = ServiceRecord::unknown(port);
        if let Some(entry) = self.table.lookup(port) {
            record = record.with_entry(entry);
        }

        let banner = match self.banners.grab(&Target::new(ip, port)).await {
            Some(b) if !b.is_empty() => b,
            _ => {
                debug!("No banner on port {}, keeping '{}'", port, record.name);
                return record;
            }
        };

        if let Some(service) = classify_banner(&banner) {
            if record.name != service {
                debug!("Port {} reclassified {} -> {} from banner", port, record.name, service);
            }
            record.name = service.to_string();
        }
        record.with_banner(banner)
    }

    /// One record per input port, in input order.
    #[instrument(skip(self, ports), fields(ports = ports.len()))]
    pub async fn identify(&self, ip: IpAddr, ports: &[u16]) -> Vec<ServiceRecord> {
        info!("Detecting services on {} open ports", ports.len());

        // `buffered` keeps output aligned with input even when probes overlap.
        let records: Vec<ServiceRecord> = stream::iter(ports.iter().copied())
            .map(|port| self.identify_port(ip, port))
            .buffered(self.concurrency)
            .collect()
            .await;

        let known = records.iter().filter(|r| !r.is_unknown()).count();
        info!("Identified {}/{} services", known, records.len());
        records
    }
}
