pub mod config;
pub mod instruction;
pub mod manager;
pub mod track;
