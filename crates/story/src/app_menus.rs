use gpui::{Action, App, Entity, KeyBinding, Menu, MenuItem, SharedString, Window};
use gpui_component::{ThemeMode, menu::AppMenuBar};

use crate::themes::SwitchThemeMode;

#[derive(Action, Clone, PartialEq, Eq)]
#[action(namespace = block_story, no_json)]
pub struct About;

#[derive(Action, Clone, PartialEq, Eq)]
#[action(namespace = block_story, no_json)]
pub struct Open;

#[derive(Action, Clone, PartialEq, Eq)]
#[action(namespace = block_story, no_json)]
pub struct Save;

#[derive(Action, Clone, PartialEq, Eq)]
#[action(namespace = block_story, no_json)]
pub struct SaveAs;

#[derive(Action, Clone, PartialEq, Eq)]
#[action(namespace = block_story, no_json)]
pub struct InsertImage;

#[derive(Action, Clone, PartialEq, Eq)]
#[action(namespace = block_story, no_json)]
pub struct Quit;

pub fn init(
    title: impl Into<SharedString>,
    window: &mut Window,
    cx: &mut App,
) -> Entity<AppMenuBar> {
    cx.on_action(|_: &Quit, cx: &mut App| {
        cx.quit();
    });

    cx.bind_keys([
        #[cfg(target_os = "macos")]
        KeyBinding::new("cmd-o", Open, None),
        #[cfg(not(target_os = "macos"))]
        KeyBinding::new("ctrl-o", Open, None),
        #[cfg(target_os = "macos")]
        KeyBinding::new("cmd-s", Save, None),
        #[cfg(not(target_os = "macos"))]
        KeyBinding::new("ctrl-s", Save, None),
        #[cfg(target_os = "macos")]
        KeyBinding::new("cmd-shift-s", SaveAs, None),
        #[cfg(not(target_os = "macos"))]
        KeyBinding::new("ctrl-shift-s", SaveAs, None),
        #[cfg(target_os = "macos")]
        KeyBinding::new("cmd-shift-i", InsertImage, None),
        #[cfg(not(target_os = "macos"))]
        KeyBinding::new("ctrl-shift-i", InsertImage, None),
        #[cfg(target_os = "macos")]
        KeyBinding::new("cmd-q", Quit, None),
    ]);

    cx.set_menus(vec![
        Menu {
            name: title.into(),
            items: vec![
                MenuItem::action("About", About),
                MenuItem::Separator,
                MenuItem::action("Open...", Open),
                MenuItem::action("Save", Save),
                MenuItem::action("Save As...", SaveAs),
                MenuItem::Separator,
                MenuItem::Submenu(Menu {
                    name: "Appearance".into(),
                    items: vec![
                        MenuItem::action("Light", SwitchThemeMode(ThemeMode::Light)),
                        MenuItem::action("Dark", SwitchThemeMode(ThemeMode::Dark)),
                    ],
                }),
                MenuItem::Separator,
                MenuItem::action("Quit", Quit),
            ],
        },
        Menu {
            name: "Edit".into(),
            items: vec![
                MenuItem::action("Undo", gpui_block_editor::Undo),
                MenuItem::action("Redo", gpui_block_editor::Redo),
                MenuItem::Separator,
                MenuItem::action("Insert Image...", InsertImage),
            ],
        },
    ]);

    AppMenuBar::new(window, cx)
}
