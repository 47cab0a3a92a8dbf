/// Core error type.
///
/// Adapter crates map their specific errors into this type so the pipeline
/// can handle failures consistently. Only the error taxonomy matters at the
/// dispatch boundary: store errors and collaborator errors both end in the
/// same generic user-facing reply, with the detail going to the log sink
/// only.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("{service} error: {detail}")]
    Collaborator {
        service: &'static str,
        detail: String,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn collaborator(service: &'static str, detail: impl Into<String>) -> Self {
        Self::Collaborator {
            service,
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
