pub mod generate;
pub mod keys;
pub mod score;
