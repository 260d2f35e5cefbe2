//! Verdict persistence.
//!
//! - [`pool`]: SQLite pool creation (file + WAL)
//! - [`migrations`]: embedded schema migrations
//! - [`cache`]: the `VerdictCache` trait and its SQLite implementation
//! - [`memory`]: an in-process implementation

pub mod cache;
pub mod memory;
pub mod migrations;
pub mod pool;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use cache::{SqliteVerdictCache, VerdictCache};
pub use memory::MemoryVerdictCache;
pub use migrations::run_migrations;
pub use pool::init_db_pool_with_path;
