pub mod app_menus;
pub mod story;
pub mod themes;

pub use story::{BlockEditorStory, StoryOptions, demo_blocks, load_blocks, save_blocks};
