//! Content source trait definitions
//!
//! The pipeline only ever talks to a [`ContentClient`]; tests substitute
//! their own implementations or the generated mock.

use async_trait::async_trait;

use crate::errors::ApiResult;
use crate::models::{Locale, RawPayload, SourceRef};

/// Fetches raw pages from the remote content API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentClient: Send + Sync {
    /// Fetch one page in the given locale
    async fn fetch(&self, source_ref: &SourceRef, locale: Locale) -> ApiResult<RawPayload>;
}
