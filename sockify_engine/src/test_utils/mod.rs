//! Helpers for tests, here and in dependent crates. Enabled with the `test_utils` feature.
pub mod fakes;

#[cfg(feature = "sqlite")]
pub mod prepare_env;
#[cfg(feature = "sqlite")]
pub mod seed;
