use axum::http::StatusCode;

/// Failure of a call to the remote plan store, as seen by the client.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("no plan found")]
    NotFound,
    #[error("plan store returned {status}: {message}")]
    Http { status: u16, message: String },
    #[error("plan store unreachable: {0}")]
    Transport(String),
    #[error("failed to decode plan store response: {0}")]
    Decode(String),
    #[error("plan store rejected the save: {0}")]
    Rejected(String),
}

impl StoreError {
    /// Text shown next to the retry affordance.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound => "Nothing planned for this day.".to_string(),
            Self::Transport(_) => "Could not reach the server. Check your connection.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Error returned by the development plan server's handlers.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// Why a save from edit mode did not go through.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SaveError {
    #[error("not in edit mode")]
    NotEditing,
    #[error("a save is already in progress")]
    InProgress,
    #[error("the edit session this save belonged to has ended")]
    Superseded,
    #[error(transparent)]
    Store(#[from] StoreError),
}
