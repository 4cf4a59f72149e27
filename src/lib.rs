pub mod core;

pub use chess_engine;
