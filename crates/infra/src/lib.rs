//! Infrastructure layer: storage backends for the permission authority.
//!
//! - [`directory::InMemoryDirectory`] for tests and local development
//! - [`directory::PgDirectory`] for Postgres deployments
//! - [`seed`] for bootstrapping an empty directory

pub mod directory;
pub mod seed;

pub use directory::{InMemoryDirectory, PgDirectory};
