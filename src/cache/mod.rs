//! Layout cache subsystem.
//!
//! # Data Flow
//! ```text
//! get_or_resolve(name)
//!     → resolved map hit?       → return component
//!     → in-flight resolution?   → await the shared future
//!     → otherwise               → resolver(name), shared with later callers
//!         → Ok: strip module wrapper, store permanently
//!         → Err: drop in-flight entry, fan the error out to every waiter
//! ```

pub mod layout;
pub mod resolver;

pub use layout::LayoutCache;
pub use resolver::{resolver_fn, LayoutResolver, StaticLayoutResolver};
