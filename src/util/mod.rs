// Utility Module
// Serialization helpers and file handling for the user directory

pub mod decimal;
pub mod file_ops;
