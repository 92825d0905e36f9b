//! Navigation subsystem.
//!
//! # Data Flow
//! ```text
//! Router guard (guard.rs)            Nested component (notifier.rs)
//!     before_enter / before_update       notify_route_update
//!             │                                 │
//!             └──────────► coordinator.rs ◄─────┘
//!                          load → select → resolve → commit
//!                                   │
//!                                   ▼
//!                          state.rs (RenderState snapshot)
//!                              → render() / LayoutEvent broadcast
//! ```
//!
//! # Design Decisions
//! - A transition mutates render state once, after every stage succeeded
//! - Transitions are numbered; a stale one never overwrites a newer commit
//! - Renderers read lock-free snapshots (arc-swap) and may subscribe to events

pub mod coordinator;
pub mod guard;
pub mod notifier;
pub mod state;

pub use coordinator::{Committed, NavigationCoordinator, TransitionKind};
pub use guard::{NavigationGuard, Proceed};
pub use notifier::LayoutNotifier;
pub use state::{CommittedLayout, LayoutChange, LayoutEvent, RenderOutput, RenderState};
