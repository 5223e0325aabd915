#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Corral Core Library
//!
//! Numeric kernels and the game model for learning automata that play
//! games over classical or quantum correlations.

pub mod error;
pub mod game;
pub mod math;
pub mod unitary;

mod proptests;

// Re-exports for convenience
pub use error::{Error, Result};
pub use game::{Game, PayoffTree};
pub use math::EPSILON;
pub use unitary::{ComplexMatrix, unitary};
