pub mod handlers;
pub mod manuscript;
