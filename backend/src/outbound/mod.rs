//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: process-local repositories for development and tests
//! - **password**: Argon2id password hashing
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod memory;
pub mod password;
pub mod persistence;
