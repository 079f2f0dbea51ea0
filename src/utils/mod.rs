//! Text helpers for front ends.

pub mod groups;
