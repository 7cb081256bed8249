//! # Puzzle Core
//!
//! The runtime layer of "The Perfect Crime": two cooperating state
//! machines over a persisted key-value store.
//!
//! ## Core Components
//!
//! - **storage**: The persisted-store seam ([`ProgressStore`]) plus the
//!   stable keys and JSON value helpers that make up the save format
//! - **visits**: The page-visitation log collaborator pages append to
//! - **clue_tracker**: Owns the discovered-clue set; unlocking, availability
//!   queries, progress ratio, and the cross-page unlock queue
//! - **ending_gate**: Weighted completion scoring and the four-branch finale
//!
//! ## Design Philosophy
//!
//! - **Shared state, not shared objects**: the tracker and the gate never
//!   call each other. They cooperate only through the store, because the
//!   pages that host them may never load together.
//! - **Fail open**: missing or damaged persisted state decodes to empty
//!   defaults. No runtime operation panics or raises; a broken save must
//!   never block the story.
//! - **Explicit injection**: components are constructed per page context
//!   and handed their store. There are no ambient globals.

pub mod clue_tracker;
pub mod ending_gate;
pub mod storage;
pub mod visits;

pub use clue_tracker::*;
pub use ending_gate::*;
pub use storage::*;
pub use visits::*;
