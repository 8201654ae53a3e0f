//! Mintforge - SPL token and OpenBook market creation for Solana.
//!
//! Re-exports the workspace crates:
//!
//! - [`sdk`]: sizing, instruction encoders, RPC and wallet capabilities
//! - [`launcher`]: transaction building, submission and the launcher service

pub use mintforge_launcher as launcher;
pub use mintforge_sdk as sdk;
