pub mod action;
pub mod app;
pub mod error;
pub mod model;
pub mod render;
pub mod runner;
pub mod ui;

pub use action::*;
pub use app::*;
pub use error::*;
pub use model::*;
pub use render::*;
pub use runner::*;
pub use ui::*;
