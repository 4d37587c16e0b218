use uuid::Uuid;

/// The authenticated identity making a request.
///
/// Handlers receive this from the auth extractor and pass it into every
/// [`PostService`](crate::PostService) call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
}

impl Principal {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}
