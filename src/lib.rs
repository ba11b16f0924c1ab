//! Technical indicators over historical candle windows.
//!
//! Every calculator is a pure function of its input slice and parameters;
//! nothing is cached or carried between calls.

pub mod config;
pub mod error;
pub mod indicator;
pub mod interpret;
pub mod model;
pub mod report;
pub mod source;
