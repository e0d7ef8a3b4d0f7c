//! HTTP-backed market data providers

pub mod util;
pub mod yahoo;
