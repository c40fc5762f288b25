//! # PubMed Harvest
//!
//! Bulk retrieval of PubMed bibliographic records through the NCBI
//! E-utilities API, which caps any single query's retrievable window at
//! 9,999 records and limits clients to 3 requests per second.
//!
//! ## Architecture
//!
//! - [`client`]: rate-limited esearch/efetch client and wire decoding
//! - [`harvest`]: date-window partitioning, record normalization, output
//!   artifacts, and the background job orchestrator
//! - [`models`]: canonical record and job status types
//! - [`config`]: configuration management
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pubmed_harvest::{EutilsClient, HarvestConfig, HarvestJob};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HarvestConfig::default();
//! let client = EutilsClient::new(&config)?;
//! let mut job = HarvestJob::spawn(client, &config, "(Brain) AND (glymph*)", Some(100));
//!
//! job.join().await;
//! println!("{:?}", job.snapshot());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod harvest;
pub mod models;

// Re-export commonly used types
pub use client::EutilsClient;
pub use config::HarvestConfig;
pub use error::{HarvestError, Result};
pub use harvest::job::{HarvestJob, JobHandle};
pub use models::{ArticleRecord, ArtifactKind, JobId, JobSnapshot, JobStatus};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
