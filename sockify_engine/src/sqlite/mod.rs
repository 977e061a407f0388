//! SQLite backend for the Sockify engine.
//!
//! Schema migrations live in `migrations/` and are embedded in the binary by [`SqliteDatabase::migrate`].
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
