//! FordConnect Query API client
//!
//! Provides a typed HTTP client for the two read-only vendor endpoints.
//!
//! # Example
//!
//! ```rust,no_run
//! use fcon_client::{FordClient, DEFAULT_BASE_URL};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = FordClient::new(DEFAULT_BASE_URL)?;
//!
//!     let garage = client.fetch_garage("access-token").await?;
//!     let data = client.fetch_telemetry("access-token").await?;
//!     println!("{} at {} km", garage.vin, data.odometer);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! ```rust,ignore
//! use fcon_client::testing::MockVendorServer;
//!
//! let server = MockVendorServer::start(vin, payload).await?;
//! let data = server.client()?.fetch_telemetry("token").await?;
//! ```

mod client;
mod error;
pub mod testing;
mod types;

pub use client::{FordClient, DEFAULT_BASE_URL};
pub use error::{ClientError, Result};
pub use types::Garage;

// Re-export core types for convenience
pub use fcon_core::{MappingError, VehicleData};
