use thiserror::Error;

/// The policy document could not be turned into an effective policy.
///
/// Every variant except [`PolicyLoadError::NotFound`] is fatal for the run: evaluation cannot
/// proceed without a policy. A missing file is treated as "no policy" by the caller.
#[derive(Debug, Error)]
pub enum PolicyLoadError {
    #[error("policy file not found: {0}")]
    NotFound(String),

    #[error("read policy {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse policy as {format}: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    #[error("policy is neither valid JSON ({json}) nor valid TOML ({toml})")]
    Unrecognized { json: String, toml: String },

    #[error("unknown maximum_severity '{0}' (expected low|medium|high|critical)")]
    UnknownSeverity(String),

    #[error("unsupported policy schema '{0}' (expected scangate.policy.v1)")]
    UnsupportedSchema(String),
}
