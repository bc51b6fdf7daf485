use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::{HostingError, Result};
use crate::models::{ExposedService, PortRange};
use crate::services::cluster::ClusterControlPlane;

type ClaimTable = Arc<Mutex<HashMap<u16, Claim>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Claim {
    /// Handed out, exposure not yet accepted by the cluster.
    Pending,
    /// Exposure accepted. Held until a scan that began after the given
    /// generation has been used for a reservation.
    Committed(u64),
}

/// Picks NodePorts for new servers.
///
/// Ports bound in the cluster come from a fresh scan on every reservation.
/// Ports handed out by this process stay claimed until a scan started after
/// their exposure was accepted, so concurrent creates in one process never
/// pick the same port even when their scans overlap. Races against other
/// processes are settled by the cluster rejecting the second exposure object.
pub struct PortAllocator {
    cluster: Arc<dyn ClusterControlPlane>,
    range: PortRange,
    claimed: ClaimTable,
    generation: Arc<AtomicU64>,
}

/// Cluster exposures observed by one scan.
#[derive(Debug)]
pub struct ClusterScan {
    generation: u64,
    exposures: Vec<ExposedService>,
}

impl ClusterScan {
    /// Every externally bound port across all namespaces.
    pub fn exposed_ports(&self) -> BTreeSet<u16> {
        self.exposures
            .iter()
            .flat_map(|e| e.node_ports.iter().copied())
            .collect()
    }

    pub fn exposure_names(&self) -> HashSet<String> {
        self.exposures.iter().map(|e| e.name.clone()).collect()
    }
}

/// A port claimed for one create. Dropping an uncommitted reservation gives
/// the port back; `commit` keeps it claimed past the drop.
#[derive(Debug)]
pub struct PortReservation {
    port: u16,
    committed: bool,
    claimed: ClaimTable,
    generation: Arc<AtomicU64>,
}

impl PortReservation {
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Record that the cluster accepted an exposure holding this port.
    pub fn commit(mut self) {
        let at = self.generation.load(Ordering::SeqCst);
        lock(&self.claimed).insert(self.port, Claim::Committed(at));
        self.committed = true;
    }
}

impl Drop for PortReservation {
    fn drop(&mut self) {
        if !self.committed {
            lock(&self.claimed).remove(&self.port);
        }
    }
}

fn lock(claimed: &ClaimTable) -> MutexGuard<'_, HashMap<u16, Claim>> {
    claimed.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PortAllocator {
    pub fn new(cluster: Arc<dyn ClusterControlPlane>, range: PortRange) -> Self {
        Self {
            cluster,
            range,
            claimed: Arc::new(Mutex::new(HashMap::new())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn range(&self) -> PortRange {
        self.range
    }

    /// List every exposure in the cluster.
    pub async fn scan(&self) -> Result<ClusterScan> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let exposures = self.cluster.list_exposures().await?;
        Ok(ClusterScan {
            generation,
            exposures,
        })
    }

    /// Scan the cluster and claim the lowest free port.
    pub async fn reserve_port(&self) -> Result<PortReservation> {
        let scan = self.scan().await?;
        self.reserve(&scan)
    }

    /// Claim the lowest port that is neither bound in `scan` nor claimed.
    pub fn reserve(&self, scan: &ClusterScan) -> Result<PortReservation> {
        let used = scan.exposed_ports();
        let mut claimed = lock(&self.claimed);
        // Committed claims older than this scan are reflected in `used`.
        claimed.retain(|_, claim| {
            !matches!(claim, Claim::Committed(at) if *at < scan.generation)
        });
        let port = lowest_free_port(self.range, |p| used.contains(&p) || claimed.contains_key(&p))
            .ok_or(HostingError::NoCapacity {
                start: self.range.start,
                end: self.range.end,
            })?;
        claimed.insert(port, Claim::Pending);
        debug!(port, "claimed node port");
        Ok(PortReservation {
            port,
            committed: false,
            claimed: self.claimed.clone(),
            generation: self.generation.clone(),
        })
    }

    pub fn claimed_count(&self) -> usize {
        lock(&self.claimed).len()
    }
}

/// Scan upward from the start of `range` for the first port not in use.
pub fn lowest_free_port(range: PortRange, is_used: impl Fn(u16) -> bool) -> Option<u16> {
    (range.start..=range.end).find(|&port| !is_used(port))
}
