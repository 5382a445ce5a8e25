//! Internal modules ported from external libraries.
//!
//! These modules contain code adapted from:
//! - scipy: linear sum assignment
pub mod scipy;
