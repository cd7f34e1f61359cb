mod block;
mod config;
mod controller;
mod document;
mod error;
mod history;
mod image;
mod palette;
mod registry;
mod text;
mod value;

pub use crate::block::*;
pub use crate::config::*;
pub use crate::controller::*;
pub use crate::document::*;
pub use crate::error::*;
pub use crate::history::*;
pub use crate::image::*;
pub use crate::palette::*;
pub use crate::registry::*;
pub use crate::text::*;
pub use crate::value::*;
