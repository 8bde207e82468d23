//! Domain types shared by sources, algorithms and the account.

pub mod candle;
pub mod signal;

pub use candle::Candle;
pub use signal::Signal;
