//! Component subsystem.
//!
//! # Data Flow
//! ```text
//! ComponentDefinition (layout?, extends?, mixins[])
//!     → inheritance.rs (depth-first search, mixins before extends)
//!     → LayoutSpec { name, props } or none
//! ```
//!
//! # Design Decisions
//! - Definitions are immutable and shared via Arc
//! - Untyped declarations are validated lazily, at resolution time
//! - Cycles are reported as errors, never looped on

pub mod definition;
pub mod inheritance;

pub use definition::{ComponentDefinition, ComponentInstance, LayoutDeclaration, LayoutSpec, Props};
pub use inheritance::resolve_declared_layout;
