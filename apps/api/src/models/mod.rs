pub mod book;
pub mod chapter;
