//! Satellite position tracking from two-line element sets.

pub mod clock;
pub mod config;
pub mod elements;
pub mod frame;
pub mod propagate;
pub mod sampler;
pub mod source;
pub mod tracker;
pub mod web;
