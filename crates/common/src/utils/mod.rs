//! General-purpose helpers shared across modules.

pub mod serde;
