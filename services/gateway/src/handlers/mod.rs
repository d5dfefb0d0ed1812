pub mod market;
pub mod orders;
pub mod positions;
