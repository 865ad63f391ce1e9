// Books and chapters: ownership-checked CRUD over PostgreSQL, plus the
// chapter pagination and statistics views built on the layout module.

pub mod handlers;
pub mod stats;
pub mod store;
