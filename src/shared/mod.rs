//! Cross-cutting concerns shared by all layers

pub mod shutdown;
