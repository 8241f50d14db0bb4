pub mod catalog;
pub mod enqueue;
pub mod files;
pub mod health;
