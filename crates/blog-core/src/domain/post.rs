use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Maximum number of posts returned by the listing queries.
pub const RECENT_POSTS_LIMIT: u64 = 20;

/// Post entity - a blog article owned by its author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub cover: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The mutable part of a post. Updates replace all of it at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub cover: String,
}

impl PostContent {
    /// Every field must be present and non-blank.
    pub fn validate(&self) -> Result<(), DomainError> {
        let fields = [&self.title, &self.summary, &self.content, &self.cover];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(DomainError::Validation(
                "Please provide all fields".to_string(),
            ));
        }
        Ok(())
    }
}

impl Post {
    /// Create a new post authored by `author_id`.
    pub fn new(author_id: Uuid, body: PostContent) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title: body.title,
            summary: body.summary,
            content: body.content,
            cover: body.cover,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every mutable field and bump `updated_at`.
    pub fn replace(&mut self, body: PostContent) {
        self.title = body.title;
        self.summary = body.summary;
        self.content = body.content;
        self.cover = body.cover;
        self.updated_at = Utc::now();
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }

    /// Fails with [`DomainError::NotAuthor`] unless `user_id` wrote this post.
    pub fn ensure_author(&self, user_id: Uuid) -> Result<(), DomainError> {
        if self.is_authored_by(user_id) {
            Ok(())
        } else {
            Err(DomainError::NotAuthor {
                entity_type: "Post",
                id: self.id,
            })
        }
    }
}

/// Public view of a post's author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub username: String,
}

/// A post together with its resolved author.
///
/// `author` is `None` when the author reference no longer points at a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostWithAuthor {
    #[serde(flatten)]
    pub post: Post,
    pub author: Option<AuthorSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(title: &str) -> PostContent {
        PostContent {
            title: title.to_string(),
            summary: "summary".to_string(),
            content: "content".to_string(),
            cover: "https://cdn.example.com/cover.png".to_string(),
        }
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        assert!(body("Hello").validate().is_ok());
        assert!(matches!(
            body("   ").validate(),
            Err(DomainError::Validation(_))
        ));

        let mut no_cover = body("Hello");
        no_cover.cover = String::new();
        assert!(no_cover.validate().is_err());
    }

    #[test]
    fn test_replace_overwrites_all_fields() {
        let mut post = Post::new(Uuid::new_v4(), body("Before"));
        let created_at = post.created_at;

        post.replace(PostContent {
            title: "After".to_string(),
            summary: "new summary".to_string(),
            content: "new content".to_string(),
            cover: "https://cdn.example.com/new.png".to_string(),
        });

        assert_eq!(post.title, "After");
        assert_eq!(post.summary, "new summary");
        assert_eq!(post.content, "new content");
        assert_eq!(post.cover, "https://cdn.example.com/new.png");
        assert_eq!(post.created_at, created_at);
        assert!(post.updated_at >= created_at);
    }

    #[test]
    fn test_ensure_author() {
        let author = Uuid::new_v4();
        let post = Post::new(author, body("Mine"));

        assert!(post.ensure_author(author).is_ok());
        assert!(matches!(
            post.ensure_author(Uuid::new_v4()),
            Err(DomainError::NotAuthor { .. })
        ));
    }

    #[test]
    fn test_post_with_author_serializes_flat() {
        let author_id = Uuid::new_v4();
        let view = PostWithAuthor {
            post: Post::new(author_id, body("Flat")),
            author: Some(AuthorSummary {
                id: author_id,
                username: "alice".to_string(),
            }),
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["title"], "Flat");
        assert_eq!(json["author"]["username"], "alice");
    }
}
