//! Runtime module — process lifecycle: boot, then stream decoding.

pub mod boot;
pub mod stream;
