//! Error types module
//!
//! All request-facing failures are unified under [`AppError`]. Each variant describes
//! its own HTTP presentation through [`ErrorMetadata`], so the API layer only has to
//! render what the error says about itself.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for degraded but handled situations
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "NOT_FOUND")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A processing stage failed and no usable artifact could be produced.
    /// `message` is shown to clients, `details` carries the underlying cause.
    #[error("{message}: {details}")]
    ProcessingFailed { message: String, details: String },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

/// How one variant is presented to clients and logs.
struct Presentation {
    status: u16,
    code: &'static str,
    kind: &'static str,
    recoverable: bool,
    action: Option<&'static str>,
    sensitive: bool,
    level: LogLevel,
}

const fn client_fault(
    status: u16,
    code: &'static str,
    kind: &'static str,
    action: &'static str,
) -> Presentation {
    Presentation {
        status,
        code,
        kind,
        recoverable: false,
        action: Some(action),
        sensitive: false,
        level: LogLevel::Debug,
    }
}

static INVALID_INPUT: Presentation = client_fault(
    400,
    "INVALID_INPUT",
    "InvalidInput",
    "Check request parameters and try again",
);
static BAD_REQUEST: Presentation = client_fault(
    400,
    "BAD_REQUEST",
    "BadRequest",
    "Check the media type segment of the URL",
);
static NOT_FOUND: Presentation = client_fault(
    404,
    "NOT_FOUND",
    "NotFound",
    "Verify the media type and filename",
);
static PAYLOAD_TOO_LARGE: Presentation = client_fault(
    413,
    "PAYLOAD_TOO_LARGE",
    "PayloadTooLarge",
    "Reduce file size and try again",
);
static UNAUTHORIZED: Presentation = client_fault(
    401,
    "UNAUTHORIZED",
    "Unauthorized",
    "Check the API key sent as a Bearer token",
);
static PROCESSING_FAILED: Presentation = Presentation {
    status: 500,
    code: "PROCESSING_FAILED",
    kind: "ProcessingFailed",
    recoverable: true,
    action: Some("Retry the upload or try a different file"),
    sensitive: false,
    level: LogLevel::Error,
};
static INTERNAL: Presentation = Presentation {
    status: 500,
    code: "INTERNAL_ERROR",
    kind: "Internal",
    recoverable: true,
    action: Some("Retry after a short delay"),
    sensitive: true,
    level: LogLevel::Error,
};

impl AppError {
    fn presentation(&self) -> &'static Presentation {
        match self {
            AppError::InvalidInput(_) => &INVALID_INPUT,
            AppError::BadRequest(_) => &BAD_REQUEST,
            AppError::NotFound(_) => &NOT_FOUND,
            AppError::PayloadTooLarge(_) => &PAYLOAD_TOO_LARGE,
            AppError::Unauthorized(_) => &UNAUTHORIZED,
            AppError::ProcessingFailed { .. } => &PROCESSING_FAILED,
            AppError::Internal(_) | AppError::InternalWithSource { .. } => &INTERNAL,
        }
    }

    /// Variant name, included in responses outside production
    pub fn error_type(&self) -> &'static str {
        self.presentation().kind
    }

    /// Full cause chain for logs and non-production responses.
    ///
    /// `ProcessingFailed` already carries its cause as text, so only that is returned.
    pub fn detailed_message(&self) -> String {
        if let AppError::ProcessingFailed { details, .. } = self {
            return details.clone();
        }

        use std::error::Error;

        let mut chain = vec![self.to_string()];
        let mut source = self.source();
        while let Some(err) = source {
            if chain.len() > 5 {
                chain.push("... (truncated)".to_string());
                break;
            }
            chain.push(format!("Caused by: {}", err));
            source = err.source();
        }
        chain.join("\n  ")
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        self.presentation().status
    }

    fn error_code(&self) -> &'static str {
        self.presentation().code
    }

    fn is_recoverable(&self) -> bool {
        self.presentation().recoverable
    }

    fn suggested_action(&self) -> Option<&'static str> {
        self.presentation().action
    }

    fn is_sensitive(&self) -> bool {
        self.presentation().sensitive
    }

    fn log_level(&self) -> LogLevel {
        self.presentation().level
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::Unauthorized(msg) => msg.clone(),
            AppError::ProcessingFailed { message, .. } => message.clone(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}
