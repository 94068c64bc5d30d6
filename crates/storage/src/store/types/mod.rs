#![forbid(unsafe_code)]

mod filters;
mod locations;
mod registrations;

pub use filters::*;
pub use locations::*;
pub use registrations::*;
