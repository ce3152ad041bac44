//! Outbound ports — interfaces for reaching the physical lock layer
//!
//! [`LockGateway`] is the architectural contract that decouples the
//! reservation engine from the concrete device transport (MQTT bridge,
//! vendor cloud, test double). The engine only ever needs "send an
//! unlock command to device X" and a success/failure answer.

use async_trait::async_trait;
use thiserror::Error;

/// Errors a gateway implementation may surface. All of them leave the
/// booking untouched; the engine reports them as `UnlockFailed`.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Device {0} is not connected")]
    DeviceOffline(String),

    #[error("Command timeout for device {0}")]
    Timeout(String),

    #[error("Device {device}: command rejected: {reason}")]
    Rejected { device: String, reason: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Port for dispatching unlock commands to a door lock.
///
/// Implementations must not block indefinitely: either resolve the
/// command against the device or fail within their own transport
/// deadline. The engine additionally wraps every dispatch in a
/// bounded timeout.
#[async_trait]
pub trait LockGateway: Send + Sync {
    /// Command the lock identified by `device_no` to open once.
    async fn send_unlock(&self, device_no: &str) -> Result<(), GatewayError>;
}
