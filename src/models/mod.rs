//! Domain model module declarations.

pub mod group_state;
pub mod idea;
pub mod poll;
pub mod reminder;
