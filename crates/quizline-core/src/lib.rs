//! quizline-core: timed quiz engine, data model, and scoring.
//!
//! This crate owns attempt state, grading and the countdown. Content and
//! result persistence are reached only through the traits in [`traits`].

pub mod attempt;
pub mod countdown;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod results;
pub mod scoring;
pub mod session;
pub mod statistics;
pub mod traits;
pub mod view;

#[cfg(test)]
mod testing;
