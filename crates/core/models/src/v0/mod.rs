mod questions;
mod reports;

pub use questions::*;
pub use reports::*;
