//! Behaviours layered on top of the state machine for specific archetypes

pub mod cloak;
pub mod mimic;
