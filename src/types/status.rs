//! Operational status report.

use serde::{Deserialize, Serialize};

use crate::resilience::CircuitState;

/// Snapshot of gateway health for operational tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayStatus {
    pub enabled: bool,
    pub circuit_state: CircuitState,
    pub cache_connected: bool,
    pub queue_size: usize,
    pub request_count_this_window: u32,
    pub failure_count: u32,
    pub backend_reachable: bool,
}
