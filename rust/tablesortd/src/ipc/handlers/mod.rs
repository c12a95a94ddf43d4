pub mod core;
pub mod page;
pub mod tables;
