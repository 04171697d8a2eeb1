//! User/company directory backends implementing the authority's store ports.

mod in_memory;
mod postgres;
mod schema;

pub use in_memory::InMemoryDirectory;
pub use postgres::PgDirectory;
