pub mod display;
pub mod export;
pub mod share;
