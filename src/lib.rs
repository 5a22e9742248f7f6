//! Library crate for movie-guess-back, exposing the session engine for the driver binary and tests.

pub mod config;
pub mod dao;
pub mod error;
pub mod providers;
pub mod services;
pub mod state;
