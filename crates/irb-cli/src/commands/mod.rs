pub mod capital;
pub mod simulate;
