pub mod demo;
pub mod describe;
pub mod dispatcher;
pub mod editors;
pub mod error;
pub mod executor;
pub mod log_sink;
pub mod model;
pub mod panel;
pub mod registry;
pub mod settings;
pub mod state;
pub mod target;
pub mod ui;
