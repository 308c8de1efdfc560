//! Board engine error types

use super::storage::StoreError;
use super::token::TokenError;

/// Coarse classification used by transports to pick a status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller lacks the required permission (403)
    Forbidden,
    /// Board, member or link absent (404)
    NotFound,
    /// Bad role, duplicate membership, unusable link or input (400)
    Validation,
    /// Optimistic retries exhausted (409)
    Conflict,
    /// Persistence or signing failure (500)
    Internal,
}

/// Board operation errors
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("Permission denied")]
    Unauthorized,

    #[error("Board not found")]
    BoardNotFound,

    #[error("Member not found on board")]
    MemberNotFound,

    #[error("Invite link not found")]
    LinkNotFound,

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("User is already a member of this board")]
    AlreadyMember,

    #[error("Invite link has expired")]
    LinkExpired,

    #[error("Invite link has reached maximum uses")]
    LinkExhausted,

    #[error("Invalid invite token")]
    InvalidToken,

    #[error("Cannot remove board owner")]
    CannotRemoveOwner,

    #[error("Cannot remove yourself, leave the board instead")]
    CannotRemoveSelf,

    #[error("Cannot modify board owner")]
    CannotModifyOwner,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Board was modified concurrently, retries exhausted")]
    Conflict,

    #[error("Store error: {0}")]
    Store(#[source] StoreError),

    #[error("Failed to issue invite token: {0}")]
    TokenIssue(TokenError),

    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

impl From<StoreError> for BoardError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingBoard(_) => BoardError::BoardNotFound,
            other => BoardError::Store(other),
        }
    }
}

impl BoardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BoardError::Unauthorized => ErrorKind::Forbidden,
            BoardError::BoardNotFound | BoardError::MemberNotFound | BoardError::LinkNotFound => {
                ErrorKind::NotFound
            }
            BoardError::InvalidRole(_)
            | BoardError::AlreadyMember
            | BoardError::LinkExpired
            | BoardError::LinkExhausted
            | BoardError::InvalidToken
            | BoardError::CannotRemoveOwner
            | BoardError::CannotRemoveSelf
            | BoardError::CannotModifyOwner
            | BoardError::InvalidInput(_) => ErrorKind::Validation,
            BoardError::Conflict => ErrorKind::Conflict,
            BoardError::Store(_) | BoardError::TokenIssue(_) | BoardError::TaskFailed(_) => {
                ErrorKind::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(BoardError::Unauthorized.kind(), ErrorKind::Forbidden);
        assert_eq!(BoardError::LinkNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(BoardError::LinkExhausted.kind(), ErrorKind::Validation);
        assert_eq!(BoardError::Conflict.kind(), ErrorKind::Conflict);
        assert_eq!(
            BoardError::Store(StoreError::Poisoned).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_missing_board_converts_to_not_found() {
        let err: BoardError = StoreError::MissingBoard(crate::core_board::types::BoardId::new("b1")).into();
        assert!(matches!(err, BoardError::BoardNotFound));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err: BoardError = StoreError::Poisoned.into();
        assert!(matches!(err, BoardError::Store(StoreError::Poisoned)));
    }
}
