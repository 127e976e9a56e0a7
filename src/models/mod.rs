pub mod addon;
pub mod catalog;

pub use addon::*;
pub use catalog::*;
