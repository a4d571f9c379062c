//! foliodash-core: the portfolio analytics dashboard engine.
//!
//! Data flows one way (generate, filter, aggregate, render). The
//! snapshot in `state` is the single source of truth and only
//! `state::reduce` advances it.

pub mod aggregate;
pub mod error;
pub mod generator;
pub mod report;
pub mod rng;
pub mod session;
pub mod state;
pub mod summary;
pub mod types;
