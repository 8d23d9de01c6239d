//! Built-in dialect definitions.

pub mod brocade_nos;
pub mod brocade_nos_basic;
