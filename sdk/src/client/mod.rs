//! JSON-RPC access to a Solana cluster.
//!
//! [`RpcConnection`] is the capability the launcher depends on;
//! [`SolanaRpcClient`] implements it over HTTP.
//!
//! # Example
//!
//! ```rust,ignore
//! use mintforge_sdk::client::{RpcConnection, SolanaRpcClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SolanaRpcClient::with_url("https://api.devnet.solana.com")?;
//!
//!     let rent = client.get_minimum_balance_for_rent_exemption(82).await?;
//!     println!("mint rent: {} lamports", rent);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod rpc;

pub use config::{Commitment, RpcClientConfig};
pub use connection::RpcConnection;
pub use error::ClientError;
pub use rpc::SolanaRpcClient;
