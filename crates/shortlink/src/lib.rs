//! `adgate-shortlink` — client for the external redirect-gate provider.
//!
//! The provider is an opaque URL-shortening service: given a destination
//! URL it returns a different URL, and a browser visiting that URL is
//! walked through the provider's interstitial pages before being
//! redirected back to the destination. The rest of the system only ever
//! calls [`ShortlinkClient::shorten`] and waits; everything about the
//! interstitial flow belongs to the provider.

mod client;
mod config;

pub use client::{ShortlinkClient, ShortlinkError};
pub use config::ShortlinkConfig;
