//! Request extractors used across handlers.

pub mod operator;
