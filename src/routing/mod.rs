//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Matched chain from the router (root → leaf)
//!     → loader.rs (resolve lazy slots in place)
//!     → selector.rs (leaf → root scan for a declared layout)
//!     → Return: LayoutSpec (declared or default)
//! ```
//!
//! # Design Decisions
//! - URL matching and history stay with the external router
//! - Entries are shared; the only mutation is lazy → concrete
//! - Selection never yields "no layout"; the default is explicit

pub mod entry;
pub mod loader;
pub mod selector;

pub use entry::{ComponentLoader, LoadedModule, MatchedRouteEntry, ViewComponent, PRIMARY_VIEW};
pub use loader::load_all;
pub use selector::{select_layout, LayoutSelector, DEFAULT_LAYOUT};
