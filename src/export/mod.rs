pub mod folders;
pub mod tables;
