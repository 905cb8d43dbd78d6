//! Hotel booking site: availability search, guest reservations and an
//! administrator back office, rendered server-side.
//!
//! The crate is laid out hexagonally. `domain` holds entities, services and
//! ports; `inbound::http` adapts them to Actix handlers; `outbound` provides
//! PostgreSQL, in-memory and mail adapters.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

pub use domain::TraceId;
pub use middleware::Trace;
