//! Session repository port.
//!
//! Defines the contract for persisting and retrieving Session aggregates.
//! Query mechanics belong to implementations; the engine only needs CRUD
//! keyed by session id and scoped by owner.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, SessionId, UserId};
use crate::domain::session::Session;

/// Repository port for Session aggregate persistence.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Saves a new session.
    ///
    /// # Errors
    ///
    /// - `PersistenceFailed` on write failure
    async fn save(&self, session: &Session) -> Result<(), DomainError>;

    /// Updates an existing session.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if session doesn't exist
    /// - `PersistenceFailed` on write failure
    async fn update(&self, session: &Session) -> Result<(), DomainError>;

    /// Finds a session by its ID. Returns `None` if not found.
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError>;

    /// Finds all sessions owned by a user.
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Vec<Session>, DomainError>;

    /// Deletes a session (primarily for testing).
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if session doesn't exist
    async fn delete(&self, id: &SessionId) -> Result<(), DomainError>;
}
