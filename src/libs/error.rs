use thiserror::Error;

/// Errors raised while loading the graph, reading anchors or chaining.
#[derive(Debug, Error)]
pub enum EfgError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or inconsistent graph description
    #[error("graph error: {0}")]
    Graph(String),

    /// A node id that is not part of the graph
    #[error("unknown node id `{0}`")]
    UnknownNode(String),

    /// Malformed anchor record
    #[error("anchor record error at `{record}`: {message}")]
    Record { record: String, message: String },

    /// Anchors of one query are not contiguous in streaming mode
    #[error("anchors of query {0} are not contiguous: are the anchors sorted? Sort them, or try flag --unsorted-input")]
    NonContiguousQuery(String),

    /// The bound revision gave up before the dummy end was reached
    #[error("no feasible chain for query of length {qlength} after {revisions} bound revisions")]
    NoFeasibleChain { qlength: i64, revisions: u32 },
}

impl EfgError {
    pub fn record(record: &str, message: impl Into<String>) -> Self {
        EfgError::Record {
            record: record.to_string(),
            message: message.into(),
        }
    }
}
