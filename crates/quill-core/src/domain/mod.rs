//! Domain entities - the core business objects.

mod post;
mod principal;
mod user;

pub use post::Post;
pub use principal::Principal;
pub use user::User;
