use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{PostInput, PostPatch};

/// Post entity - a blog post owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    /// Owner reference. Set at creation, never reassigned.
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post owned by `user_id`.
    pub fn new(user_id: Uuid, input: PostInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            content: input.content,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge the fields present in `patch`, leaving the rest untouched.
    pub fn apply(&mut self, patch: PostPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, content: &str) -> PostInput {
        PostInput {
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_new_post_sets_owner_and_timestamps() {
        let owner = Uuid::new_v4();
        let post = Post::new(owner, input("Hello", "World"));

        assert_eq!(post.user_id, owner);
        assert_eq!(post.title, "Hello");
        assert_eq!(post.content, "World");
        assert_eq!(post.created_at, post.updated_at);
    }

    #[test]
    fn test_apply_merges_only_present_fields() {
        let mut post = Post::new(Uuid::new_v4(), input("Old", "Body"));
        let created_at = post.created_at;

        post.apply(PostPatch {
            title: Some("New".to_string()),
            content: None,
        });

        assert_eq!(post.title, "New");
        assert_eq!(post.content, "Body");
        assert_eq!(post.created_at, created_at);
        assert!(post.updated_at >= created_at);
    }
}
