pub mod display;
pub mod price;
pub mod ticker;
