//! # Stagecraft
//!
//! Declarative 2D scenes: describe nodes, sprite sheets and animation clips
//! in an indentation-based scene file, load them into a scene graph, and
//! drive it frame by frame through an abstract draw context.
//!
//! This crate re-exports [`stagecraft_core`]; the headless driver lives in
//! the `stagecraft-cli` workspace member.

pub use stagecraft_core::*;
