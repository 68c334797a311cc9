//! Completion error taxonomy with retry classification.
//!
//! Every failure that reaches the orchestrator is a [`ClassifiedError`].
//! Callers branch on [`ErrorKind`] instead of matching message text; the
//! substring heuristics used by completion providers live in one place,
//! [`classify`].
//!
//! ## Kinds
//!
//! | Kind               | Recoverable | Orchestrator action                    |
//! |--------------------|-------------|----------------------------------------|
//! | MissingCredential  | no          | abort before any request               |
//! | RateLimited        | yes         | skip to next model, no backoff         |
//! | ModelUnavailable   | yes         | skip to next model, no backoff         |
//! | Transient          | yes         | back off, retry same model             |
//! | Exhausted          | no          | every model/attempt failed             |

use std::fmt;

use thiserror::Error;

/// Classification used by the orchestrator to decide between retry and skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No usable API credential configured.
    MissingCredential,
    /// HTTP 429 or a quota / rate-limit message.
    RateLimited,
    /// HTTP 404 or a model "not found" / "not supported" message.
    ModelUnavailable,
    /// Anything else; possibly recovers on retry.
    Transient,
    /// All models and attempts failed.
    Exhausted,
}

impl ErrorKind {
    /// `true` for failures that are permanent for the current model only.
    pub fn skips_model(self) -> bool {
        matches!(self, Self::RateLimited | Self::ModelUnavailable)
    }

    /// `true` for failures that end the whole run.
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::MissingCredential | Self::Exhausted)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredential => write!(f, "missing_credential"),
            Self::RateLimited => write!(f, "rate_limited"),
            Self::ModelUnavailable => write!(f, "model_unavailable"),
            Self::Transient => write!(f, "transient"),
            Self::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// A completion failure tagged with its [`ErrorKind`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub message: String,
    /// HTTP status returned by the endpoint, when the failure came from one.
    pub http_status: Option<u16>,
    /// For `Exhausted`, the kind of the last underlying failure.
    pub last_kind: Option<ErrorKind>,
}

impl ClassifiedError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            http_status: None,
            last_kind: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn missing_credential() -> Self {
        Self::new(
            ErrorKind::MissingCredential,
            "API credential is missing or too short",
        )
    }

    /// Build an error from an HTTP status and/or message, classifying it.
    pub fn from_response(http_status: Option<u16>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: classify(http_status, &message),
            message,
            http_status,
            last_kind: None,
        }
    }

    /// Wrap the last observed failure once every model has been tried.
    ///
    /// A `None` input means nothing was attempted (empty model list).
    pub fn exhausted(last: Option<ClassifiedError>) -> Self {
        match last {
            Some(last) => Self {
                kind: ErrorKind::Exhausted,
                message: last.message,
                http_status: last.http_status,
                last_kind: Some(last.kind),
            },
            None => Self::new(ErrorKind::Exhausted, "no models configured"),
        }
    }
}

/// Map an HTTP status and error message onto an [`ErrorKind`].
///
/// Rate limiting wins over unavailability when both match. Message matching
/// is case-insensitive.
pub fn classify(http_status: Option<u16>, message: &str) -> ErrorKind {
    let lower = message.to_ascii_lowercase();

    if http_status == Some(429)
        || lower.contains("429")
        || lower.contains("quota")
        || lower.contains("rate_limit")
    {
        return ErrorKind::RateLimited;
    }

    if http_status == Some(404)
        || lower.contains("not found")
        || lower.contains("not supported")
        || lower.contains("does not exist")
    {
        return ErrorKind::ModelUnavailable;
    }

    ErrorKind::Transient
}
