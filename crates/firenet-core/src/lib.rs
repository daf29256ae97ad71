//! Session, caching and attribute mapping core for RIKA Firenet stoves.
//!
//! Sits between `firenet-api` and a home-automation host:
//!
//! - **[`Stove`]** — Facade exposing [`get_attribute`](Stove::get_attribute)
//!   and [`set_attribute`](Stove::set_attribute). Cheaply cloneable; every
//!   clone shares one session and one cache.
//!
//! - **[`SessionManager`]** — Owns the cookie-bearing client and the
//!   account credentials. Logins are single-flight.
//!
//! - **[`ReadCoalescer`]** — [`StatusCache`] plus an `Idle` /
//!   `FetchInFlight` state machine: at most one status fetch at a time,
//!   every queued read answered exactly once, on success or failure.
//!
//! - **[`RemoteAdapter`]** — Status fetch and fetch-modify-post control
//!   writes, with bounded re-login on HTTP 401.
//!
//! - **Domain model** ([`model`]) — [`Attribute`], [`AttributeValue`],
//!   [`StoveSnapshot`]; the raw-payload mapping lives in [`convert`].

pub mod cache;
pub mod coalesce;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod remote;
pub mod session;
pub mod stove;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::StatusCache;
pub use coalesce::{Admission, Completion, ReadCoalescer};
pub use config::{DEFAULT_FRESHNESS, StoveConfig, TlsVerification};
pub use error::CoreError;
pub use remote::RemoteAdapter;
pub use session::{ConnectionState, SessionManager};
pub use stove::Stove;

pub use model::{
    Attribute, AttributeValue, ControlChange, HeaterCoolerState, StoveSnapshot,
    TargetHeaterCoolerState,
};
