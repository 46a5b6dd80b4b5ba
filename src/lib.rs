//! Asthma travel-risk intake bot for LINE.

pub mod app;
pub mod aqi;
pub mod channels;
pub mod config;
pub mod error;
pub mod intake;
