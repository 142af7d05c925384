//! Content sources
//!
//! # Usage
//!
//! ```rust,no_run
//! use hoyowiki_ingest::config::ClientConfig;
//! use hoyowiki_ingest::models::{Locale, SourceRef};
//! use hoyowiki_ingest::sources::{ContentClient, HoyoWikiClient};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HoyoWikiClient::new(&ClientConfig::default())?;
//!     let page = client.fetch(&SourceRef::new("31"), Locale::EnUs).await?;
//!     println!("{:?}", page.name);
//!     Ok(())
//! }
//! ```

pub mod hoyowiki;
pub mod traits;

pub use hoyowiki::HoyoWikiClient;
pub use traits::ContentClient;

#[cfg(test)]
pub use traits::MockContentClient;
