//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod access_token_repo;

pub use access_token_repo::AccessTokenRepo;
