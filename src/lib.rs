pub mod app;
pub mod engine;
pub mod error;
pub mod generators;
pub mod maze;
pub mod random;
pub mod solvers;

pub use engine::MazeEngine;
pub use error::{MazeError, Result};
