pub mod outbound;

pub use outbound::{GatewayError, LockGateway};
