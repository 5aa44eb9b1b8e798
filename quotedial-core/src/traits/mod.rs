//! Hardware abstraction traits
//!
//! These traits define the interface between the dial logic and the
//! board-specific servo, radio, HTTP client and watchdog.

pub mod actuator;
pub mod link;
pub mod system;
pub mod transport;
pub mod watchdog;

pub use actuator::{Actuator, ActuatorError};
pub use link::{Credentials, LinkError, NetworkLink, MAX_PASSWORD_LEN, MAX_SSID_LEN};
pub use system::SystemMonitor;
pub use transport::{HttpResponse, QuoteTransport, TransportError};
pub use watchdog::Watchdog;
