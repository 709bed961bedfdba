//! Image record persistence.
//!
//! The [`ImageRepository`] trait is the only surface the pipeline and API
//! depend on; [`PgImageRepository`] is the production Postgres backend and
//! [`InMemoryImageRepository`] serves tests and fully in-memory wiring.

mod memory;
mod pool;
mod postgres;
mod repository;

pub use memory::InMemoryImageRepository;
pub use pool::connect_pool;
pub use postgres::PgImageRepository;
pub use repository::ImageRepository;
