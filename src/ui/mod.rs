pub mod app;
pub mod components;
pub mod sink;
pub mod state;

pub use app::ChatApp;
