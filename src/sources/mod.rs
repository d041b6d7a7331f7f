//! Settings source implementations.

mod env;

pub use env::{DIR_VAR, ENDPOINT_VAR, ENV_PREFIX, EnvSource};
