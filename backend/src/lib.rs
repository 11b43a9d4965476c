//! Postcard exchange backend.
//!
//! Members send postcards that arrive at the next daily delivery slot
//! (18:30 UTC), keep a ledger of who they have written to, collect stamps
//! from a shop, and ask admins for new stamp designs.
//!
//! Layout follows a hexagonal split: [`domain`] holds types, services and
//! ports; [`inbound`] adapts HTTP onto the driving ports; [`outbound`]
//! implements the driven ports over PostgreSQL, memory, and Argon2.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
