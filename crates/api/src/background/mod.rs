//! Background tasks spawned from `main`.

pub mod token_retention;
