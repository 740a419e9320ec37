use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blog_core::domain::{Post, PostWithAuthor};
use blog_core::error::RepoError;
use blog_core::ports::{BaseRepository, PostRepository};

use super::InMemoryUserRepository;

/// Post store that resolves authors against an [`InMemoryUserRepository`].
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
    users: Arc<InMemoryUserRepository>,
}

impl InMemoryPostRepository {
    pub fn new(users: Arc<InMemoryUserRepository>) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            users,
        }
    }

    async fn resolve(&self, post: Post) -> PostWithAuthor {
        let author = self.users.summary(post.author_id).await;
        PostWithAuthor { post, author }
    }

    /// Snapshot of posts matching `filter`, newest first.
    async fn newest_first(&self, filter: impl Fn(&Post) -> bool) -> Vec<Post> {
        let store = self.store.read().await;
        let mut posts: Vec<Post> = store.values().filter(|p| filter(*p)).cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        if store.contains_key(&post.id) {
            return Err(RepoError::Constraint(format!("post {} already exists", post.id)));
        }
        store.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        match store.get_mut(&post.id) {
            Some(existing) => {
                *existing = post.clone();
                Ok(post)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_recent(&self, limit: u64) -> Result<Vec<PostWithAuthor>, RepoError> {
        let mut result = Vec::new();
        for post in self.newest_first(|_| true).await {
            if result.len() as u64 >= limit {
                break;
            }
            let resolved = self.resolve(post).await;
            if resolved.author.is_some() {
                result.push(resolved);
            }
        }
        Ok(result)
    }

    async fn find_with_author(&self, id: Uuid) -> Result<Option<PostWithAuthor>, RepoError> {
        match self.find_by_id(id).await? {
            Some(post) => Ok(Some(self.resolve(post).await)),
            None => Ok(None),
        }
    }

    async fn find_by_author(
        &self,
        author_id: Uuid,
        limit: u64,
    ) -> Result<Vec<PostWithAuthor>, RepoError> {
        let mut result = Vec::new();
        for post in self
            .newest_first(|p| p.author_id == author_id)
            .await
            .into_iter()
            .take(limit as usize)
        {
            result.push(self.resolve(post).await);
        }
        Ok(result)
    }
}
