//! Infrastructure layer for mouse-bounds.
//!
//! Contains OS-facing adapters: cursor access, raw keyboard devices, display
//! enumeration, and read-only config storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `bounds_core`, but MUST NOT be imported by the `application` or domain
//! layers (tests excepted).

pub mod cursor;
pub mod keyboard;
pub mod screen_info;
pub mod storage;
