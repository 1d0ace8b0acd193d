pub mod cursor;
pub mod file;
pub mod page;
mod tuple;
