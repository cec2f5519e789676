//! Scene load errors
//!
//! A scene is either fully assembled or unusable, so every failure along the
//! fetch -> parse -> decode path collapses into one of three kinds.

/// Scene loading errors
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    /// Raw animation data could not be retrieved
    FetchFailed(String),
    /// Response body is not an animation document
    ParseFailed(String),
    /// A worker failed to decode one frame
    DecodeFailed {
        clip: usize,
        frame: usize,
        reason: String,
    },
}

impl LoadError {
    /// Short kind label for logs and the check report
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::FetchFailed(_) => "fetch",
            LoadError::ParseFailed(_) => "parse",
            LoadError::DecodeFailed { .. } => "decode",
        }
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::FetchFailed(e) => write!(f, "Fetch failed: {}", e),
            LoadError::ParseFailed(e) => write!(f, "Parse failed: {}", e),
            LoadError::DecodeFailed { clip, frame, reason } => {
                write!(f, "Decode failed at clip {} frame {}: {}", clip, frame, reason)
            }
        }
    }
}

impl std::error::Error for LoadError {}
