//! Console front end for the `proventos` binary.

pub mod console;
pub mod output;
