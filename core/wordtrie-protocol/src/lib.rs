#![no_std] // Only `model` needs an allocator

extern crate alloc;

// Enable std if the feature is active (for tests/tools)
#[cfg(feature = "std")]
extern crate std;

pub mod ids;
pub mod format;

// Re-export core types for convenience
pub use ids::NodeId;
pub use format::*;

pub mod model;
pub use model::*;
