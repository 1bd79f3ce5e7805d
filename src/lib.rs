pub mod config;
pub mod core;
pub mod models;
pub mod planning;
pub mod scanner;
pub mod source;
pub mod strategies;
#[cfg(test)]
pub mod test_helpers;
