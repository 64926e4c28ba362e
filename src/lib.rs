pub mod core;
pub mod relay;
pub mod server;
pub mod state;
pub mod upstream;
