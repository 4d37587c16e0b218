//! Post resource service.
//!
//! Composes payload validation, the ownership guard and a [`PostRepository`]
//! into the list/create/read/update/delete operations. Every operation takes
//! the caller's [`Principal`] explicitly.

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::domain::{Post, Principal};
use crate::error::{DomainError, RepoError};
use crate::policy::ensure_owner;
use crate::ports::PostRepository;
use crate::validation::{UpdateMode, validate_post, validate_update};

/// Post CRUD scoped to the calling principal.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// Posts owned by the caller, oldest first.
    pub async fn list(&self, principal: &Principal) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.find_by_user_id(principal.user_id).await?)
    }

    /// Every post regardless of owner, oldest first.
    ///
    /// Only reachable when the server is configured for global listing.
    pub async fn list_all(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.find_all().await?)
    }

    /// Validate `payload` and store a new post owned by the caller.
    pub async fn create(&self, principal: &Principal, payload: &Value) -> Result<Post, DomainError> {
        let input = validate_post(payload)?;
        let post = Post::new(principal.user_id, input);
        Ok(self.posts.insert(post).await?)
    }

    /// Fetch a post the caller owns.
    pub async fn read(&self, principal: &Principal, id: Uuid) -> Result<Post, DomainError> {
        let post = self.find(id).await?;
        ensure_owner(principal, &post)?;
        Ok(post)
    }

    /// Validate `payload`, then merge it into a post the caller owns.
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        payload: &Value,
        mode: UpdateMode,
    ) -> Result<Post, DomainError> {
        let patch = validate_update(payload, mode)?;

        let mut post = self.find(id).await?;
        ensure_owner(principal, &post)?;

        post.apply(patch);
        self.posts.update(post).await.map_err(|e| not_found_or(e, id))
    }

    /// Remove a post the caller owns.
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), DomainError> {
        let post = self.find(id).await?;
        ensure_owner(principal, &post)?;

        self.posts.delete(post.id).await.map_err(|e| not_found_or(e, id))
    }

    async fn find(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "Post",
                id,
            })
    }
}

/// The row vanished between lookup and write.
fn not_found_or(err: RepoError, id: Uuid) -> DomainError {
    match err {
        RepoError::NotFound => DomainError::NotFound {
            entity_type: "Post",
            id,
        },
        other => DomainError::Repository(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::BaseRepository;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Vec-backed store that keeps insertion order.
    #[derive(Default)]
    struct FakePosts {
        rows: Mutex<Vec<Post>>,
    }

    impl FakePosts {
        fn snapshot(&self) -> Vec<Post> {
            self.rows.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BaseRepository<Post, Uuid> for FakePosts {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
            Ok(self.rows.lock().unwrap().iter().find(|p| p.id == id).cloned())
        }

        async fn insert(&self, post: Post) -> Result<Post, RepoError> {
            self.rows.lock().unwrap().push(post.clone());
            Ok(post)
        }

        async fn update(&self, post: Post) -> Result<Post, RepoError> {
            let mut rows = self.rows.lock().unwrap();
            let slot = rows
                .iter_mut()
                .find(|p| p.id == post.id)
                .ok_or(RepoError::NotFound)?;
            *slot = post.clone();
            Ok(post)
        }

        async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|p| p.id != id);
            if rows.len() == before {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PostRepository for FakePosts {
        async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
            Ok(self.snapshot())
        }
    }

    fn setup() -> (PostService, Arc<FakePosts>) {
        let store = Arc::new(FakePosts::default());
        (PostService::new(store.clone()), store)
    }

    fn user() -> Principal {
        Principal::new(Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_create_assigns_owner_and_fresh_id() {
        let (service, store) = setup();
        let alice = user();

        let first = service
            .create(&alice, &json!({"title": "Hello", "content": "World"}))
            .await
            .unwrap();
        let second = service
            .create(&alice, &json!({"title": "Hello", "content": "World"}))
            .await
            .unwrap();

        assert_eq!(first.user_id, alice.user_id);
        assert_eq!(first.title, "Hello");
        assert_eq!(first.content, "World");
        assert_ne!(first.id, second.id);
        assert_eq!(store.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn test_create_ignores_client_supplied_owner() {
        let (service, _) = setup();
        let alice = user();
        let bob = user();

        let post = service
            .create(
                &alice,
                &json!({"title": "t", "content": "c", "user_id": bob.user_id}),
            )
            .await
            .unwrap();

        assert_eq!(post.user_id, alice.user_id);
    }

    #[tokio::test]
    async fn test_invalid_payloads_never_touch_the_store() {
        let (service, store) = setup();
        let alice = user();
        let post = service
            .create(&alice, &json!({"title": "t", "content": "c"}))
            .await
            .unwrap();

        for payload in [json!({}), json!({"title": "t"}), json!({"content": "c"})] {
            let err = service.create(&alice, &payload).await.unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));

            let err = service
                .update(&alice, post.id, &payload, UpdateMode::Replace)
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }

        assert_eq!(store.snapshot(), vec![post]);
    }

    #[tokio::test]
    async fn test_validation_runs_before_lookup() {
        let (service, _) = setup();
        let err = service
            .update(&user(), Uuid::new_v4(), &json!({}), UpdateMode::Replace)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_owner_reads_post_unchanged() {
        let (service, _) = setup();
        let alice = user();
        let created = service
            .create(&alice, &json!({"title": "t", "content": "c"}))
            .await
            .unwrap();

        let read = service.read(&alice, created.id).await.unwrap();
        assert_eq!(read, created);
    }

    #[tokio::test]
    async fn test_non_owner_is_forbidden() {
        let (service, store) = setup();
        let alice = user();
        let mallory = user();
        let post = service
            .create(&alice, &json!({"title": "t", "content": "c"}))
            .await
            .unwrap();

        let err = service.read(&mallory, post.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let err = service
            .update(
                &mallory,
                post.id,
                &json!({"title": "x", "content": "y"}),
                UpdateMode::Replace,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let err = service.delete(&mallory, post.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        assert_eq!(store.snapshot(), vec![post]);
    }

    #[tokio::test]
    async fn test_missing_post_is_not_found() {
        let (service, _) = setup();
        let alice = user();
        let id = Uuid::new_v4();

        assert!(matches!(
            service.read(&alice, id).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
        assert!(matches!(
            service
                .update(&alice, id, &json!({"title": "t"}), UpdateMode::Merge)
                .await
                .unwrap_err(),
            DomainError::NotFound { .. }
        ));
        assert!(matches!(
            service.delete(&alice, id).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_merge_update_keeps_absent_fields() {
        let (service, _) = setup();
        let alice = user();
        let post = service
            .create(&alice, &json!({"title": "Old", "content": "Body"}))
            .await
            .unwrap();

        let updated = service
            .update(&alice, post.id, &json!({"title": "New"}), UpdateMode::Merge)
            .await
            .unwrap();

        assert_eq!(updated.title, "New");
        assert_eq!(updated.content, "Body");
        assert_eq!(updated.user_id, alice.user_id);
        assert_eq!(service.read(&alice, post.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_replace_update_overwrites_both_fields() {
        let (service, _) = setup();
        let alice = user();
        let post = service
            .create(&alice, &json!({"title": "Old", "content": "Body"}))
            .await
            .unwrap();

        let updated = service
            .update(
                &alice,
                post.id,
                &json!({"title": "New", "content": "Text"}),
                UpdateMode::Replace,
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "New");
        assert_eq!(updated.content, "Text");
        assert_eq!(updated.created_at, post.created_at);
    }

    #[tokio::test]
    async fn test_delete_is_terminal() {
        let (service, _) = setup();
        let alice = user();
        let post = service
            .create(&alice, &json!({"title": "t", "content": "c"}))
            .await
            .unwrap();

        service.delete(&alice, post.id).await.unwrap();

        assert!(matches!(
            service.read(&alice, post.id).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_caller_in_insertion_order() {
        let (service, _) = setup();
        let alice = user();
        let bob = user();

        let a1 = service
            .create(&alice, &json!({"title": "a1", "content": "c"}))
            .await
            .unwrap();
        let b1 = service
            .create(&bob, &json!({"title": "b1", "content": "c"}))
            .await
            .unwrap();
        let a2 = service
            .create(&alice, &json!({"title": "a2", "content": "c"}))
            .await
            .unwrap();

        assert_eq!(service.list(&alice).await.unwrap(), vec![a1.clone(), a2.clone()]);
        assert_eq!(service.list(&bob).await.unwrap(), vec![b1.clone()]);
        assert!(service.list(&user()).await.unwrap().is_empty());
        assert_eq!(service.list_all().await.unwrap(), vec![a1, b1, a2]);
    }
}
