use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("scheduler returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid scheduler response: {0}")]
    InvalidResponse(String),
}
