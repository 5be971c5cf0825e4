//! Ecological systems for predation.
//!
//! This module contains:
//! - Predation (length-structured predators with linear consumption)
//! - Depletion (prey-side consumption bookkeeping and the overconsumption cap)

pub mod depletion;
pub mod predation;

pub use depletion::Prey;
pub use predation::{LinearPredator, PreyLink};
