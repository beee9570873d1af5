//! Library components of the IVR field mapper CLI.

#![allow(missing_docs)]

pub mod input;
pub mod logging;
