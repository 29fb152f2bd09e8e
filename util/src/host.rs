//! Host platform utility functions

use std::path::PathBuf;
use thiserror::Error;

/// Name of the environment variable pointing at the software root directory.
pub const SW_ROOT_ENV_VAR: &str = "TRITON_SW_ROOT";

/// Possible errors when querying the host environment.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("The software root environment variable (TRITON_SW_ROOT) is not set")]
    SwRootNotSet
}

/// Get the path to the software root directory.
///
/// The root is read from the `TRITON_SW_ROOT` environment variable and is
/// used to locate the `params` and `sessions` directories.
pub fn get_triton_sw_root() -> Result<PathBuf, HostError> {
    match std::env::var(SW_ROOT_ENV_VAR) {
        Ok(p) => Ok(PathBuf::from(p)),
        Err(_) => Err(HostError::SwRootNotSet)
    }
}
