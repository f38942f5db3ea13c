pub mod backend;
pub mod body;
pub mod buffer;
pub mod c_api;
pub mod config;
pub mod error;
pub mod kernel;
pub mod persistence;
pub mod scenario;
pub mod simulation;
pub mod store;

pub use backend::{Backend, Tick};
pub use body::Body;
pub use buffer::{KernelBody, KernelBuffer};
pub use config::Config;
pub use error::{Result, SimError};
pub use scenario::Bounds;
pub use simulation::{advance, Simulation, TickReport};
pub use store::BodyStore;
pub use ultraviolet::DVec2;
