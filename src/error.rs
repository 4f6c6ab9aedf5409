use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a pipeline stage before it writes anything.
///
/// Missing keys inside a document and malformed markup are deliberately not
/// represented here: both are treated as "zero matches" by the engines.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("source file '{}' not found", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("no '{attribute}' attribute found in input")]
    MissingAttribute { attribute: String },

    #[error("embedded JSON failed to parse: {source}")]
    MalformedJson {
        #[from]
        source: serde_json::Error,
    },

    #[error("failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Map an I/O error on `path`, singling out the not-found case.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            PipelineError::SourceNotFound { path }
        } else {
            PipelineError::Io { path, source }
        }
    }
}
