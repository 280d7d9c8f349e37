pub mod display;
pub mod engine;
pub mod event;
pub mod level;
pub mod step;
pub mod world;
