#![deny(missing_docs)]

//! Core types shared across the gch workspace: the structured error surface,
//! the explicit configuration that replaces ad-hoc globals, permutation
//! helpers and the deterministic RNG handle.

pub mod config;
pub mod errors;
pub mod perm;
pub mod rng;

pub use config::Config;
pub use errors::{ErrorInfo, GchError};
pub use perm::Perm;
pub use rng::{derive_substream_seed, RngHandle};
