pub mod rebuild;
pub mod summary;
