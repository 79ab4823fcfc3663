pub mod arena;
pub mod config;
pub mod simulator;
