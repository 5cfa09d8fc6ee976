// Library exports for the Battlesnake decision engine
// This allows the replay tool and integration tests to use the core bot logic

pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod error;
pub mod flood_fill;
pub mod grid;
pub mod pathfinder;
pub mod replay;
pub mod safety;
pub mod selector;
pub mod simple_profiler;
pub mod types;
