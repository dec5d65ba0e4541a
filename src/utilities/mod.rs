//! Utility modules: errors, console output, file handling, sandboxed
//! execution, and string helpers.

pub mod errors;
pub mod file_handler;
pub mod printer;
pub mod sandbox;
pub mod string_utils;
