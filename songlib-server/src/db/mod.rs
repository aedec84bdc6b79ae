//! Database layer - pool, transaction context and repositories
//!
//! Every repository operation takes a [`DbContext`] and runs its statements
//! on the runner [`Database::runner`] selects for it: the context's open
//! transaction when there is one, a pooled connection otherwise.

pub mod context;
pub mod error;
pub mod pool;
pub mod repos;
pub mod runner;
pub mod schema;
pub mod transactor;

pub use context::{DbContext, TxHandle};
pub use error::DbError;
pub use pool::{create_pool, create_pool_with_options, DEFAULT_MAX_CONNECTIONS};
pub use repos::{CoupletRepository, PgCoupletRepo, PgSongRepo, SongRepository};
pub use runner::{Database, QueryRunner};
pub use schema::ensure_schema;
pub use transactor::Transactor;
