// Wildclash Schema - Shared type definitions
// This crate contains the static data model shared between the battle engine
// and its content tooling: elements, action definitions, and creature
// definitions. Everything here is read-only at battle time.

// Re-export the main types
pub use actions::*;
pub use creatures::*;
pub use elements::*;

pub mod actions;
pub mod creatures;
pub mod elements;
