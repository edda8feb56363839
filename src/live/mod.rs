//! Connection-facing layer: sessions, their registry, and the boundary types.

pub mod manager;
pub mod protocol;
pub mod publisher;
pub mod session;
