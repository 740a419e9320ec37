use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, PostWithAuthor, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. Fails with [`RepoError::NotFound`] if it is gone.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository. Read queries resolve the author alongside each post.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Newest posts first, at most `limit`, skipping posts whose author is gone.
    async fn find_recent(&self, limit: u64) -> Result<Vec<PostWithAuthor>, RepoError>;

    /// A single post and its author, if any.
    async fn find_with_author(&self, id: Uuid) -> Result<Option<PostWithAuthor>, RepoError>;

    /// Newest posts by one author first, at most `limit`.
    async fn find_by_author(
        &self,
        author_id: Uuid,
        limit: u64,
    ) -> Result<Vec<PostWithAuthor>, RepoError>;
}
