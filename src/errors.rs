use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChampionError {
    #[error("score {score} is not higher than prev score {prev_score}")]
    NotHigherScore { score: i64, prev_score: i64 },

    #[error("not authorized")]
    NotAuthorized,

    #[error("storage failure: {0}")]
    Storage(String),
}

impl ChampionError {
    pub fn status(&self) -> StatusCode {
        match self {
            ChampionError::NotAuthorized => StatusCode::UNAUTHORIZED,
            // Losing submissions have always been reported as 500; clients
            // parse the message, so the status stays.
            ChampionError::NotHigherScore { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ChampionError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ChampionError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
