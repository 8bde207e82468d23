//! FortsRobot Core: streaming signal algorithms and account simulation.
//!
//! This crate contains:
//! - Domain types (candles, signals)
//! - The candle source abstraction with in-memory, delimited-text and
//!   synthetic providers
//! - Streaming moving averages (ring-buffer SMA, seeded EMA)
//! - The algorithm lifecycle and the Basic and Guppi (GMMA) algorithms
//! - The account aggregator with weighted-average realisation
//!
//! Data flows one candle at a time: source → algorithm → account.

pub mod account;
pub mod algorithms;
pub mod data;
pub mod domain;
pub mod indicators;

pub use account::AccountAggregator;
pub use algorithms::{Algorithm, BasicAlgorithm, GuppiAlgorithm, InitOutcome};
pub use data::{CandleSource, SourceError};
pub use domain::{Candle, Signal};
