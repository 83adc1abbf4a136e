//! newsalpha — news-event excess-return backtester.
//!
//! Aligns discrete news events to tradable close-to-close windows, scores
//! signal-directed returns against a benchmark index, and compares the
//! resulting strategy to random-signal and naive baselines.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in
//! [`ports`], concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
