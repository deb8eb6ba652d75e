//! Core types for deepvocab.

mod dictionary;
mod explanation;
mod legacy;
mod review;

pub use dictionary::*;
pub use explanation::*;
pub use legacy::*;
pub use review::*;
