//! In-memory repositories - used when no database is configured, and in
//! tests. Data is lost on process restart.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Post, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, UserRepository};

/// Vec-backed store; iteration order is insertion order.
struct Rows<T> {
    rows: RwLock<Vec<T>>,
}

impl<T: Clone> Rows<T> {
    fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    async fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.rows.read().await.iter().find(|row| pred(row)).cloned()
    }

    async fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows
            .read()
            .await
            .iter()
            .filter(|row| pred(row))
            .cloned()
            .collect()
    }

    async fn replace(&self, entity: T, pred: impl Fn(&T) -> bool) -> Result<T, RepoError> {
        let mut rows = self.rows.write().await;
        let slot = rows
            .iter_mut()
            .find(|row| pred(row))
            .ok_or(RepoError::NotFound)?;
        *slot = entity.clone();
        Ok(entity)
    }

    async fn remove(&self, pred: impl Fn(&T) -> bool) -> Result<(), RepoError> {
        let mut rows = self.rows.write().await;
        let position = rows
            .iter()
            .position(|row| pred(row))
            .ok_or(RepoError::NotFound)?;
        rows.remove(position);
        Ok(())
    }
}

/// In-memory user repository. Emails are unique.
pub struct InMemoryUserRepository {
    users: Rows<User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self { users: Rows::new() }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.users.find(|u| u.id == id).await)
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut rows = self.users.rows.write().await;
        if rows.iter().any(|u| u.id == user.id || u.email == user.email) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        rows.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let id = user.id;
        self.users.replace(user, |u| u.id == id).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.users.remove(|u| u.id == id).await
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self.users.find(|u| u.email == email).await)
    }
}

/// In-memory post repository.
pub struct InMemoryPostRepository {
    posts: Rows<Post>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self { posts: Rows::new() }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.find(|p| p.id == id).await)
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut rows = self.posts.rows.write().await;
        if rows.iter().any(|p| p.id == post.id) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        rows.push(post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let id = post.id;
        self.posts.replace(post, |p| p.id == id).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.posts.remove(|p| p.id == id).await
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError> {
        Ok(self.posts.filter(|p| p.user_id == user_id).await)
    }

    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.posts.filter(|_| true).await)
    }
}
