#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod canvas;
pub mod data_url;
pub mod error;
pub mod generation;
pub mod input;
pub mod panels;
pub mod settings;
pub mod texture_manager;
pub mod util;

pub use app::SketchApp;
pub use canvas::SketchCanvas;
pub use error::{CanvasError, GenerationError};
pub use generation::{GenerationBackend, GenerationFlow, HttpBackend};
pub use input::{CanvasInput, InputHandler};
pub use settings::Settings;
