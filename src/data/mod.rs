pub mod export;
pub mod loader;
pub mod remote;
pub mod resolve;
pub mod sample;
