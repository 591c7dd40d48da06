use thiserror::Error;

/// Convenient result alias for the starlane library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a system name has no entry in the name bucket.
    #[error("unknown system name: {name}")]
    UnknownSystem { name: String },

    /// Raised when an id64 has no entry in the systems bucket.
    #[error("unknown system id64: {id64}")]
    UnknownSystemId { id64: u64 },

    /// A stored row or key violates the format contract.
    #[error("malformed {what}: {detail}")]
    Malformed {
        what: &'static str,
        detail: String,
    },

    /// The ship cannot fuel a jump of the requested distance.
    #[error("not enough fuel: jump needs {required} t but {available} t remain")]
    NotEnoughFuel { required: f64, available: f64 },

    /// FSD class outside the known 2-8 table.
    #[error("unsupported FSD class {class}; expected 2-8")]
    UnknownFsdClass { class: u8 },

    /// Unrecognised FSD rating letter.
    #[error("unsupported FSD rating {rating:?}; expected one of A-E")]
    UnknownFsdRating { rating: String },

    /// Write attempted through a handle opened read-only.
    #[error("store was opened read-only")]
    ReadOnly,

    /// `insert_system` called after `finish_insert` on the same handle.
    #[error("bulk load already finished on this handle")]
    ImportFinished,

    /// An import worker thread died without reporting.
    #[error("import worker thread panicked")]
    WorkerPanicked,

    /// Aggregate of per-batch failures, surfaced once by `finish_insert`.
    #[error("import finished with {} failed batch(es)", errors.len())]
    Import { errors: Vec<Error> },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for storage engine errors.
    #[error(transparent)]
    Storage(#[from] redb::Error),

    /// Wrapper for record (de)serialisation errors.
    #[error(transparent)]
    Record(#[from] serde_json::Error),
}

impl From<redb::DatabaseError> for Error {
    fn from(err: redb::DatabaseError) -> Self {
        Error::Storage(err.into())
    }
}

impl From<redb::TransactionError> for Error {
    fn from(err: redb::TransactionError) -> Self {
        Error::Storage(err.into())
    }
}

impl From<redb::TableError> for Error {
    fn from(err: redb::TableError) -> Self {
        Error::Storage(err.into())
    }
}

impl From<redb::StorageError> for Error {
    fn from(err: redb::StorageError) -> Self {
        Error::Storage(err.into())
    }
}

impl From<redb::CommitError> for Error {
    fn from(err: redb::CommitError) -> Self {
        Error::Storage(err.into())
    }
}
