//! SeaORM entities. Column layout matches the `migration` crate.

pub mod post;
pub mod user;
