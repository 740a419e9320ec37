//! Domain entities - the core business objects.

mod post;
mod user;

pub use post::{AuthorSummary, Post, PostContent, PostWithAuthor, RECENT_POSTS_LIMIT};
pub use user::User;
