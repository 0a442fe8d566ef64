use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Maximum number of writes a single batch may carry before it is rejected.
///
/// Mirrors the operation cap the managed document store imposes; callers that
/// fan out more writes must chunk them into sequential batches.
pub const MAX_BATCH_OPERATIONS: usize = 500;

/// Error raised by the document store adapter.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An `update` targeted a document that does not exist.
    #[error("document `{id}` not found in `{collection}`")]
    DocumentNotFound {
        /// Collection that was addressed.
        collection: String,
        /// Identifier of the missing document.
        id: String,
    },
    /// A batch exceeded [`MAX_BATCH_OPERATIONS`].
    #[error("write batch holds {size} operations, limit is {limit}")]
    BatchTooLarge {
        /// Number of buffered operations.
        size: usize,
        /// The enforced cap.
        limit: usize,
    },
    /// A transaction kept conflicting with concurrent commits and gave up.
    #[error("transaction aborted after {attempts} conflicting attempts")]
    TransactionContention {
        /// How many times the closure was retried.
        attempts: u32,
    },
    /// A document could not be encoded to or decoded from its stored shape.
    #[error("document codec failure in `{collection}`: {source}")]
    Codec {
        /// Collection whose document failed to round-trip.
        collection: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Construct a [`StorageError::DocumentNotFound`].
    pub fn not_found(collection: &str, id: &str) -> Self {
        StorageError::DocumentNotFound {
            collection: collection.to_owned(),
            id: id.to_owned(),
        }
    }

    /// Construct a [`StorageError::Codec`].
    pub fn codec(collection: &str, source: serde_json::Error) -> Self {
        StorageError::Codec {
            collection: collection.to_owned(),
            source,
        }
    }
}
