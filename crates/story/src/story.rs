use std::path::{Path, PathBuf};

use anyhow::Context as _;
use gpui::{
    App, AppContext as _, Context, Entity, InteractiveElement as _, IntoElement,
    ParentElement as _, PathPromptOptions, Render, StatefulInteractiveElement as _, Styled as _, Subscription, Window, div,
    prelude::FluentBuilder as _, px,
};
use gpui_block_core::{Block, BlockKind, BlockValue, EditorConfig, History};
use gpui_block_editor::{BlockEditor, BlockEditorEvent, BlockEditorState, Redo, Undo};
use gpui_component::{
    ActiveTheme as _, Disableable as _, Sizable as _, TitleBar, WindowExt as _,
    button::{Button, ButtonVariants as _},
    menu::AppMenuBar,
    notification::Notification,
};

use crate::app_menus::{About, InsertImage, Open, Save, SaveAs};

const DEFAULT_FILE_NAME: &str = "blocks.json";

/// What the window starts with.
#[derive(Debug, Clone, Default)]
pub struct StoryOptions {
    pub config: EditorConfig,
    pub blocks: Option<Vec<Block>>,
    pub file_path: Option<PathBuf>,
}

/// Read a saved block list.
pub fn load_blocks(path: &Path) -> anyhow::Result<Vec<Block>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let document = BlockValue::from_json_str(&content)?.into_document()?;
    Ok(document.into_blocks())
}

pub fn save_blocks(path: &Path, blocks: &[Block]) -> anyhow::Result<()> {
    let json = BlockValue::from_blocks(blocks.to_vec()).to_json_pretty()?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn demo_blocks() -> Vec<Block> {
    vec![
        Block::new(BlockKind::Heading1, "Block editor"),
        Block::paragraph(
            "Every line is a block. Type / to turn the current block into something else, or use \
             the + next to a block to insert a new one.",
        ),
        Block::new(BlockKind::Heading2, "Markdown shortcuts"),
        Block::new(BlockKind::List, "Type \"# \" at the start of a block for a heading"),
        Block::new(BlockKind::List, "\"- \" starts a bulleted list and \"1. \" a numbered one"),
        Block::new(BlockKind::List, "\"> \" makes a quote and \"```\" a code block"),
        Block::new(BlockKind::Heading2, "Moving things around"),
        Block::new(BlockKind::OrderedList, "Hover a block to reveal its handle"),
        Block::new(BlockKind::OrderedList, "Drag the handle to reorder"),
        Block::new(BlockKind::Quote, "Undo with cmd-z, redo with cmd-shift-z."),
        Block::new(BlockKind::Code, "{ \"type\": \"paragraph\", \"content\": \"hello\" }"),
        Block::paragraph(""),
    ]
}

/// The owner of the block list. Records history and persists to disk.
pub struct BlockEditorStory {
    app_menu_bar: Entity<AppMenuBar>,
    editor: Entity<BlockEditorState>,
    blocks: Vec<Block>,
    history: History,
    file_path: Option<PathBuf>,
    _subscriptions: Vec<Subscription>,
}

impl BlockEditorStory {
    pub fn new(
        options: StoryOptions,
        app_menu_bar: Entity<AppMenuBar>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let StoryOptions {
            config,
            blocks,
            file_path,
        } = options;
        let history = History::new(config.max_undo);
        let initial = blocks.unwrap_or_else(demo_blocks);

        let editor = cx.new(|cx| {
            BlockEditorState::new(window, cx)
                .config(config)
                .default_blocks(initial)
        });
        let blocks = editor.read(cx).blocks().to_vec();
        let _subscriptions = vec![cx.subscribe_in(&editor, window, Self::on_editor_event)];

        let focus_handle = editor.read(cx).focus_handle();
        window.focus(&focus_handle);

        let mut story = Self {
            app_menu_bar,
            editor,
            blocks,
            history,
            file_path: None,
            _subscriptions,
        };
        if let Some(path) = file_path {
            story.set_file_path(path, window);
        }
        story
    }

    pub fn view(
        options: StoryOptions,
        app_menu_bar: Entity<AppMenuBar>,
        window: &mut Window,
        cx: &mut App,
    ) -> Entity<Self> {
        cx.new(|cx| Self::new(options, app_menu_bar, window, cx))
    }

    fn on_editor_event(
        &mut self,
        _: &Entity<BlockEditorState>,
        event: &BlockEditorEvent,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        match event {
            BlockEditorEvent::Change(change) => {
                self.history.record_change(&change.kind, &self.blocks);
                self.blocks = change.blocks.clone();
                cx.notify();
            }
            BlockEditorEvent::UndoRequested => self.undo(window, cx),
            BlockEditorEvent::RedoRequested => self.redo(window, cx),
        }
    }

    fn undo(&mut self, _window: &mut Window, cx: &mut Context<Self>) {
        if let Some(blocks) = self.history.undo(&self.blocks) {
            self.replace_blocks(blocks, cx);
        }
    }

    fn redo(&mut self, _window: &mut Window, cx: &mut Context<Self>) {
        if let Some(blocks) = self.history.redo(&self.blocks) {
            self.replace_blocks(blocks, cx);
        }
    }

    fn replace_blocks(&mut self, blocks: Vec<Block>, cx: &mut Context<Self>) {
        let result = self
            .editor
            .update(cx, |editor, cx| editor.set_blocks(blocks.clone(), cx));
        match result {
            Ok(()) => self.blocks = blocks,
            Err(err) => tracing::warn!("rejected block list: {err}"),
        }
        cx.notify();
    }

    fn title(&self) -> String {
        self.file_path
            .as_ref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "Untitled".to_string())
    }

    fn set_file_path(&mut self, path: PathBuf, window: &mut Window) {
        self.file_path = Some(path);
        window.set_window_title(&format!("{} - Block Editor", self.title()));
    }

    fn load(
        &mut self,
        blocks: Vec<Block>,
        path: PathBuf,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        tracing::info!("opened {} ({} blocks)", path.display(), blocks.len());
        self.history.clear();
        self.set_file_path(path, window);
        self.replace_blocks(blocks, cx);
    }

    fn open_from_file(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let picked = cx.prompt_for_paths(PathPromptOptions {
            files: true,
            directories: false,
            multiple: false,
            prompt: Some("Open Blocks JSON".into()),
        });

        let this = cx.entity();
        cx.spawn_in(window, async move |_, window| {
            let path: PathBuf = picked.await.ok()?.ok()??.into_iter().next()?;
            let loaded = load_blocks(&path);
            window
                .update(|window, cx| match loaded {
                    Ok(blocks) => {
                        this.update(cx, |this, cx| this.load(blocks, path, window, cx));
                    }
                    Err(err) => {
                        tracing::warn!("failed to open {}: {err:#}", path.display());
                        window.push_notification(
                            Notification::new().message(format!("Failed to open: {err}")),
                            cx,
                        );
                    }
                })
                .ok();
            Some(())
        })
        .detach();
    }

    fn save_to_file(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let Some(path) = self.file_path.clone() else {
            self.save_as(window, cx);
            return;
        };

        let message = match save_blocks(&path, &self.blocks) {
            Ok(()) => format!("Saved to {}", path.display()),
            Err(err) => {
                tracing::warn!("failed to save {}: {err:#}", path.display());
                format!("Failed to save: {err}")
            }
        };
        window.push_notification(Notification::new().message(message), cx);
    }

    fn save_as(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let blocks = self.blocks.clone();
        let directory = self
            .file_path
            .as_ref()
            .and_then(|path| path.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        let suggested_name = self
            .file_path
            .as_ref()
            .and_then(|p| p.file_name().map(|name| name.to_string_lossy().to_string()))
            .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());

        let picked = cx.prompt_for_new_path(&directory, Some(&suggested_name));
        let this = cx.entity();

        cx.spawn_in(window, async move |_, window| {
            let path: PathBuf = picked.await.ok()?.ok()??;
            let saved = save_blocks(&path, &blocks);
            window
                .update(|window, cx| {
                    let message = match saved {
                        Ok(()) => {
                            let message = format!("Saved to {}", path.display());
                            this.update(cx, |this, _| this.set_file_path(path, window));
                            message
                        }
                        Err(err) => format!("Failed to save: {err}"),
                    };
                    window.push_notification(Notification::new().message(message), cx);
                })
                .ok();
            Some(())
        })
        .detach();
    }

    fn insert_image(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let after = {
            let editor = self.editor.read(cx);
            editor
                .focused_block()
                .map(|focused| focused.id.clone())
                .or_else(|| editor.blocks().last().map(|block| block.id.clone()))
        };
        let Some(after) = after else {
            return;
        };

        let picked = cx.prompt_for_paths(PathPromptOptions {
            files: true,
            directories: false,
            multiple: false,
            prompt: Some("Insert Image".into()),
        });

        let editor = self.editor.clone();
        cx.spawn_in(window, async move |_, window| {
            let path: PathBuf = picked.await.ok()?.ok()??.into_iter().next()?;
            window
                .update(|window, cx| {
                    let inserted = editor.update(cx, |editor, cx| {
                        editor.insert_image_from_path(&path, &after, window, cx)
                    });
                    if let Err(err) = inserted {
                        window.push_notification(
                            Notification::new().message(format!("Failed to insert image: {err}")),
                            cx,
                        );
                    }
                })
                .ok();
            Some(())
        })
        .detach();
    }
}

impl Render for BlockEditorStory {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme().clone();
        let can_undo = self.history.can_undo();
        let can_redo = self.history.can_redo();
        let title = self.title();

        let toolbar = div()
            .flex()
            .flex_row()
            .items_center()
            .gap(px(4.))
            .px(px(12.))
            .py(px(6.))
            .border_b_1()
            .border_color(theme.border)
            .bg(theme.background)
            .child(
                Button::new("undo")
                    .label("Undo")
                    .small()
                    .ghost()
                    .disabled(!can_undo)
                    .on_click(cx.listener(|this, _, window, cx| this.undo(window, cx))),
            )
            .child(
                Button::new("redo")
                    .label("Redo")
                    .small()
                    .ghost()
                    .disabled(!can_redo)
                    .on_click(cx.listener(|this, _, window, cx| this.redo(window, cx))),
            )
            .child(div().w(px(1.)).h(px(16.)).bg(theme.border))
            .child(
                Button::new("open")
                    .label("Open")
                    .small()
                    .ghost()
                    .on_click(cx.listener(|this, _, window, cx| this.open_from_file(window, cx))),
            )
            .child(
                Button::new("save")
                    .label("Save")
                    .small()
                    .ghost()
                    .on_click(cx.listener(|this, _, window, cx| this.save_to_file(window, cx))),
            )
            .child(
                Button::new("insert-image")
                    .label("Image")
                    .small()
                    .ghost()
                    .on_click(cx.listener(|this, _, window, cx| this.insert_image(window, cx))),
            )
            .child(
                div()
                    .ml_auto()
                    .text_xs()
                    .text_color(theme.muted_foreground)
                    .child(format!("{title} · {} blocks", self.blocks.len()))
                    .when(self.history.undo_len() > 0, |this| {
                        this.child(format!(" · {} undo", self.history.undo_len()))
                    }),
            );

        div()
            .size_full()
            .flex()
            .flex_col()
            .bg(theme.muted)
            .on_action(cx.listener(|this, _: &Open, window, cx| {
                this.open_from_file(window, cx);
            }))
            .on_action(cx.listener(|this, _: &Save, window, cx| {
                this.save_to_file(window, cx);
            }))
            .on_action(cx.listener(|this, _: &SaveAs, window, cx| {
                this.save_as(window, cx);
            }))
            .on_action(cx.listener(|this, _: &InsertImage, window, cx| {
                this.insert_image(window, cx);
            }))
            // Reached from the menu when the editor does not hold focus.
            .on_action(cx.listener(|this, _: &Undo, window, cx| this.undo(window, cx)))
            .on_action(cx.listener(|this, _: &Redo, window, cx| this.redo(window, cx)))
            .on_action(cx.listener(|_, _: &About, window, cx| {
                window.push_notification(
                    Notification::new().message("Block Editor").autohide(true),
                    cx,
                );
            }))
            .child(
                TitleBar::new().child(
                    div()
                        .flex()
                        .items_center()
                        .child(self.app_menu_bar.clone()),
                ),
            )
            .child(toolbar)
            .child(
                div()
                    .id("block-editor-scroll")
                    .flex_1()
                    .overflow_y_scroll()
                    .p(px(24.))
                    .child(
                        div()
                            .mx_auto()
                            .max_w(px(760.))
                            .child(BlockEditor::new(&self.editor)),
                    ),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpui_block_core::BlockRegistry;

    #[test]
    fn saved_blocks_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let blocks = demo_blocks();

        save_blocks(&path, &blocks).unwrap();
        assert_eq!(load_blocks(&path).unwrap(), blocks);
    }

    #[test]
    fn demo_shortcut_hints_are_exact_prefixes() {
        let registry = BlockRegistry::standard();
        let hints: Vec<String> = demo_blocks()
            .iter()
            .filter(|block| block.kind == BlockKind::List)
            .flat_map(|block| {
                block
                    .content
                    .split('"')
                    .skip(1)
                    .step_by(2)
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        assert_eq!(hints.len(), 5);
        for hint in hints {
            let matched = registry.match_shortcut(&hint).unwrap();
            assert_eq!(matched.prefix_len, hint.len(), "{hint:?}");
        }
    }

    #[test]
    fn loading_rejects_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dup.json");
        std::fs::write(
            &path,
            r#"{"blocks":[{"id":"a","type":"paragraph"},{"id":"a","type":"quote"}]}"#,
        )
        .unwrap();

        assert!(load_blocks(&path).is_err());
    }

    #[test]
    fn loading_a_missing_file_names_the_path() {
        let err = load_blocks(Path::new("/nonexistent/blocks.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/blocks.json"));
    }

    #[test]
    fn demo_ids_are_unique() {
        let blocks = demo_blocks();
        assert!(gpui_block_core::Document::new(blocks).is_ok());
    }
}
