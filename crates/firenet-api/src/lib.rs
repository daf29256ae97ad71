//! Async Rust client for the RIKA Firenet stove web service.
//!
//! Firenet is a cookie-session web application: a form login at
//! `/web/login` sets a session cookie, and every `/api/client/{stove}`
//! call after that is authorised by the cookie alone.
//!
//! - **[`FirenetClient`]** — one HTTP round trip per call. Classifies the
//!   outcome into [`Error`] variants but never retries; re-login policy
//!   belongs to the caller.
//! - **[`TransportConfig`]** — shared `reqwest::Client` construction
//!   (TLS mode, timeout, cookie jar).
//! - **[`StoveStatus`]** — the raw `status` payload with its `controls`
//!   and `sensors` objects kept as loosely-typed JSON maps.

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::FirenetClient;
pub use error::Error;
pub use models::{Controls, Sensors, StoveStatus};
pub use transport::{TlsMode, TransportConfig};

/// Public Firenet endpoint.
pub const DEFAULT_BASE_URL: &str = "https://www.rika-firenet.com";
