//! Use-case layer: response normalization, error classification, and the
//! gateway operations that chain them.

pub mod classifier;
pub mod gateway;
pub mod normalizer;
