//! Port of `scipy.optimize.linear_sum_assignment`.

mod optimize;

pub use optimize::*;
