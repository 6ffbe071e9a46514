//! RecordMatcher trait: the seam between batching and the transport

use async_trait::async_trait;
use crate::error::BoardnetResult;
use super::{MatchResponse, RecordType};

/// A record-matching service.
///
/// Implemented by:
/// - `PermIdMatcher` - uploads CSV batches to the remote match API
/// - test doubles that answer from memory
#[async_trait]
pub trait RecordMatcher: Send + Sync {
    /// Match one batch of records, given as a CSV document with header.
    async fn match_batch(&self, record_type: RecordType, csv: String) -> BoardnetResult<MatchResponse>;
}
