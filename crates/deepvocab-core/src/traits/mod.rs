//! Capabilities the gateway composes but does not implement.

mod explainer;
mod remote;

pub use explainer::*;
pub use remote::*;
