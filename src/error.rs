//! Run-level error type.
//!
//! Every failure that should stop the run is an `AppError` carrying the
//! process exit code it maps to. Recoverable conditions (empty or malformed
//! responses for a single query) never become an `AppError`; they turn into
//! empty series at the point where they are detected.

/// Invalid arguments, configuration, or local file I/O.
pub const EXIT_INVALID_INPUT: u8 = 2;
/// A keyword produced no data and the run was configured to abort on that.
pub const EXIT_EMPTY_RESULT: u8 = 3;
/// The trends service could not be reached or refused to serve us.
pub const EXIT_EXTERNAL: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(EXIT_INVALID_INPUT, message)
    }

    pub fn empty_result(message: impl Into<String>) -> Self {
        Self::new(EXIT_EMPTY_RESULT, message)
    }

    pub fn external(message: impl Into<String>) -> Self {
        Self::new(EXIT_EXTERNAL, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
