//! # Quantum-Interactives Test Suite
//!
//! Cross-crate scenarios for the frame protocol.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── reload.rs     # reload idempotence, structural equality, runtime-only changes
//!     ├── listeners.rs  # listener symmetry across reloads
//!     ├── unload.rs     # flush with and without a live channel
//!     ├── proxy.rs      # request id round-trip through two levels
//!     └── composite.rs  # host session driving a composite end to end
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p qi-tests
//! cargo test -p qi-tests integration::reload::
//! ```

#![allow(dead_code)]

pub mod integration;
