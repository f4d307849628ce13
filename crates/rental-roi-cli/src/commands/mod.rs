pub mod assumptions;
pub mod deal;
pub mod market;
pub mod rent;
