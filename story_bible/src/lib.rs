//! # Story Bible
//!
//! The static content layer for "The Perfect Crime" - an interactive
//! mystery about a novelist trapped in the forty-seventh iteration of his
//! own unfinished book. This crate is the single source of truth for the
//! story graph and contains no runtime state.
//!
//! ## Core Components
//!
//! - **clues**: Clue definitions with prerequisites and forward references
//! - **endings**: The four narrative branches the finale can resolve to
//! - **storyline**: The validated aggregate loaded from an embedded TOML
//!   document at startup
//!
//! Everything here is immutable after [`Storyline::load`] succeeds. The
//! runtime layer (`puzzle_core`) borrows the storyline and never mutates it.

pub mod clues;
pub mod endings;
pub mod storyline;

pub use clues::*;
pub use endings::*;
pub use storyline::*;
