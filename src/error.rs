// Copyright (c) 2026 rezky_nightky

//! Error types for the simulation engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GaussianError {
    /// A mode buffer could not be reserved; the mode cannot run without it.
    #[error("failed to allocate {what} ({len} elements)")]
    Alloc { what: &'static str, len: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GaussianError>;

/// Builds a vector with exactly `len` slots reserved, reporting failure
/// instead of aborting the process.
pub fn try_vec<T>(what: &'static str, len: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| GaussianError::Alloc { what, len })?;
    Ok(v)
}

/// Like [`try_vec`], filled with `len` copies of `value`.
pub fn try_filled<T: Clone>(what: &'static str, len: usize, value: T) -> Result<Vec<T>> {
    let mut v = try_vec(what, len)?;
    v.resize(len, value);
    Ok(v)
}
