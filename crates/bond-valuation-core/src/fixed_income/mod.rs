pub mod analysis;
pub mod bond;
pub mod duration;
pub mod yields;

pub use bond::{Bond, BondTerms};
