use std::fmt;

use thiserror::Error;

/// Where within a login or request a failure was first reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The initial credential login against the developer site.
    Login,
    /// Sending the request or reading its response body.
    Transport,
    /// The outer relay response envelope.
    Envelope,
    /// The JSON body nested within the relay response.
    Body,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Login => "login",
            Stage::Transport => "transport",
            Stage::Envelope => "relay envelope",
            Stage::Body => "response body",
        };
        f.write_str(name)
    }
}

/// Reasons an access token could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenErrorKind {
    CannotObtainToken,
}

/// Coarse classification of a [`NikeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Token,
    Request,
    InvalidArgument,
    Client,
}

/// Possible errors while talking to the Nike+ developer relay.
#[derive(Debug, Error)]
pub enum NikeError {
    /// The access token exchange failed. The client is unusable.
    #[error("cannot obtain access token ({stage}): {detail}")]
    Token {
        kind: TokenErrorKind,
        stage: Stage,
        detail: String,
    },

    /// An authenticated call failed. `detail` holds the message or code
    /// reported by whichever layer failed first.
    #[error("request failed at {stage}: {detail}")]
    Request { stage: Stage, detail: String },

    /// Arguments were rejected before any request was made.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The underlying HTTP client could not be constructed.
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl NikeError {
    pub(crate) fn token(stage: Stage, detail: impl Into<String>) -> Self {
        NikeError::Token {
            kind: TokenErrorKind::CannotObtainToken,
            stage,
            detail: detail.into(),
        }
    }

    pub(crate) fn request(stage: Stage, detail: impl Into<String>) -> Self {
        NikeError::Request {
            stage,
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            NikeError::Token { .. } => ErrorKind::Token,
            NikeError::Request { .. } => ErrorKind::Request,
            NikeError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            NikeError::Client(_) => ErrorKind::Client,
        }
    }

    /// The failing stage, if the error came from a network exchange.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            NikeError::Token { stage, .. } | NikeError::Request { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The raw message or code carried by this error.
    pub fn detail(&self) -> String {
        match self {
            NikeError::Token { detail, .. } | NikeError::Request { detail, .. } => detail.clone(),
            NikeError::InvalidArgument(message) => message.clone(),
            NikeError::Client(error) => error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NikeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_errors_are_always_cannot_obtain_token() {
        let error = NikeError::token(Stage::Body, "missing access_token");
        assert_eq!(error.kind(), ErrorKind::Token);
        assert_eq!(error.stage(), Some(Stage::Body));
        assert!(matches!(
            error,
            NikeError::Token {
                kind: TokenErrorKind::CannotObtainToken,
                ..
            }
        ));
        assert_eq!(
            error.to_string(),
            "cannot obtain access token (response body): missing access_token"
        );
    }

    #[test]
    fn request_errors_keep_their_detail() {
        let error = NikeError::request(Stage::Envelope, "E1");
        assert_eq!(error.kind(), ErrorKind::Request);
        assert_eq!(error.detail(), "E1");
        assert_eq!(error.to_string(), "request failed at relay envelope: E1");
    }
}
