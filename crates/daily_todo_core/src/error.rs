use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("storage_unavailable - {0}")]
    StorageUnavailable(String),
    #[error("invalid_username - {0}")]
    InvalidUsername(String),
    #[error("duplicate_user - {0}")]
    DuplicateUser(String),
    #[error("auth_failure - {0}")]
    AuthFailure(String),
    #[error("wrong_password - {0}")]
    WrongPassword(String),
    #[error("mismatch - {0}")]
    Mismatch(String),
    #[error("empty_title - {0}")]
    EmptyTitle(String),
    #[error("not_found - {0}")]
    NotFound(String),
    #[error("terminal_state - {0}")]
    TerminalState(String),
    #[error("invalid_transition - {0}")]
    InvalidTransition(String),
    #[error("invalid_range - {0}")]
    InvalidRange(String),
    #[error("invalid_input - {0}")]
    InvalidInput(String),
    #[error("invalid_data - {0}")]
    InvalidData(String),
}

impl AppError {
    pub fn storage_unavailable<M: Into<String>>(message: M) -> Self {
        Self::StorageUnavailable(message.into())
    }

    pub fn invalid_username<M: Into<String>>(message: M) -> Self {
        Self::InvalidUsername(message.into())
    }

    pub fn duplicate_user<M: Into<String>>(message: M) -> Self {
        Self::DuplicateUser(message.into())
    }

    pub fn auth_failure<M: Into<String>>(message: M) -> Self {
        Self::AuthFailure(message.into())
    }

    pub fn wrong_password<M: Into<String>>(message: M) -> Self {
        Self::WrongPassword(message.into())
    }

    pub fn mismatch<M: Into<String>>(message: M) -> Self {
        Self::Mismatch(message.into())
    }

    pub fn empty_title<M: Into<String>>(message: M) -> Self {
        Self::EmptyTitle(message.into())
    }

    pub fn not_found<M: Into<String>>(message: M) -> Self {
        Self::NotFound(message.into())
    }

    pub fn terminal_state<M: Into<String>>(message: M) -> Self {
        Self::TerminalState(message.into())
    }

    pub fn invalid_transition<M: Into<String>>(message: M) -> Self {
        Self::InvalidTransition(message.into())
    }

    pub fn invalid_range<M: Into<String>>(message: M) -> Self {
        Self::InvalidRange(message.into())
    }

    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::InvalidUsername(_) => "invalid_username",
            Self::DuplicateUser(_) => "duplicate_user",
            Self::AuthFailure(_) => "auth_failure",
            Self::WrongPassword(_) => "wrong_password",
            Self::Mismatch(_) => "mismatch",
            Self::EmptyTitle(_) => "empty_title",
            Self::NotFound(_) => "not_found",
            Self::TerminalState(_) => "terminal_state",
            Self::InvalidTransition(_) => "invalid_transition",
            Self::InvalidRange(_) => "invalid_range",
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::StorageUnavailable(message)
            | Self::InvalidUsername(message)
            | Self::DuplicateUser(message)
            | Self::AuthFailure(message)
            | Self::WrongPassword(message)
            | Self::Mismatch(message)
            | Self::EmptyTitle(message)
            | Self::NotFound(message)
            | Self::TerminalState(message)
            | Self::InvalidTransition(message)
            | Self::InvalidRange(message)
            | Self::InvalidInput(message)
            | Self::InvalidData(message) => message,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageUnavailable(err.to_string())
    }
}
