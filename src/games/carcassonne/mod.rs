pub mod board;
pub mod game;
pub mod meeples;
pub mod moves;
pub mod render;
pub mod scoring;
pub mod tiles;
pub mod types;
