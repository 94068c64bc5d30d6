#![forbid(unsafe_code)]

mod reference;
mod validate;

pub use reference::*;
pub use validate::*;
