//! `adgate-client` — device-side entitlement cache and revalidation.
//!
//! Embeds in a viewer application. Owns the persistent device identity,
//! the advisory entitlement cache, and the [`EntitlementMonitor`] state
//! machine that keeps the cached entitlement honest against the server:
//! optimistic locally, authoritative remotely.
//!
//! # Example
//!
//! ```no_run
//! use adgate_client::{ClientConfig, EntitlementMonitor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new(
//!         "https://api.example.com",
//!         "https://app.example.com/verify-key",
//!         "/var/lib/viewer",
//!     );
//!     let monitor = EntitlementMonitor::start(config)?;
//!
//!     // Ask for a gate URL and send the user through it...
//!     let unlock = monitor.request_unlock().await?;
//!     println!("open {}", unlock.gate_url);
//!
//!     // ...then, on the return navigation carrying ?token=...:
//!     let granted = monitor.complete_unlock(&unlock.token).await?;
//!     println!("unlocked: {granted}");
//!     Ok(())
//! }
//! ```

mod cache;
mod config;
mod device;
mod error;
mod gateway;
mod monitor;
mod redirect;

pub use cache::{CachedEntitlement, EntitlementCache};
pub use config::ClientConfig;
pub use device::DeviceIdentity;
pub use error::{ClientError, Result};
pub use gateway::{AccessGateway, HttpGateway, IssuedKey, ValidationOutcome};
pub use monitor::{EntitlementMonitor, EntitlementState};
pub use redirect::token_from_redirect_url;
