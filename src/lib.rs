pub mod args;
pub mod cli;
pub mod config;
mod export;
pub mod import;
pub mod ir;
mod operations;
