use pretty_assertions::assert_eq;
use richtext_core::commands::insert_characters;
use richtext_core::{
    BOLD, Block, BlockRenderConfig, BlockRenderer, BlockType, Decorator, Document, Editor,
    EditorConfig, EditorState, Extension, HandleResult, KeyEvent, Pipeline, RenderContext,
    STRIKETHROUGH, SelectionState, StyleProps, StyleSet,
};
use smol_str::SmolStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Contributes fixed values to every merge point.
struct Fixed {
    name: &'static str,
    color: &'static str,
    class: &'static str,
}

impl Extension for Fixed {
    fn name(&self) -> &str {
        self.name
    }

    fn custom_style(&self, _styles: &StyleSet, _block: &Block) -> StyleProps {
        let mut props = StyleProps::new();
        props.insert("color".into(), self.color.into());
        props.insert(self.name.into(), "1".into());
        props
    }

    fn block_style(&self, _block: &Block) -> Option<SmolStr> {
        Some(SmolStr::new(self.class))
    }

    fn block_renderer(&self, _block: &Block, _ctx: &RenderContext<'_>) -> Option<BlockRenderer> {
        Some(BlockRenderer::new(self.name))
    }
}

/// Panics in every hook it implements.
struct Panicking;

impl Extension for Panicking {
    fn name(&self) -> &str {
        "panicking"
    }

    fn custom_style(&self, _styles: &StyleSet, _block: &Block) -> StyleProps {
        panic!("classifier exploded")
    }

    fn handle_key_command(&self, _command: &str, _state: &EditorState) -> HandleResult {
        panic!("handler exploded")
    }

    fn handle_before_input(&self, _chars: &str, _state: &EditorState) -> HandleResult {
        panic!("handler exploded")
    }

    fn decorators(&self) -> Vec<Decorator> {
        vec![Decorator::new("boom", |_, _| panic!("strategy exploded"))]
    }

    fn on_change(&self, _state: EditorState) -> EditorState {
        panic!("transform exploded")
    }
}

/// Binds ctrl+b to strikethrough and types in upper case.
struct Shouting;

impl Extension for Shouting {
    fn name(&self) -> &str {
        "shouting"
    }

    fn key_binding(&self, event: &KeyEvent) -> Option<SmolStr> {
        (event.key == "b" && event.has_command_modifier()).then(|| SmolStr::new("strike"))
    }

    fn handle_key_command(&self, command: &str, state: &EditorState) -> HandleResult {
        if command != "strike" {
            return HandleResult::NotHandled;
        }
        let styles = state.current_inline_style().with(STRIKETHROUGH);
        HandleResult::Handled(state.set_inline_style_override(styles))
    }

    fn handle_before_input(&self, chars: &str, state: &EditorState) -> HandleResult {
        match insert_characters(state, &chars.to_uppercase()) {
            Ok(next) => HandleResult::Handled(next),
            Err(_) => HandleResult::NotHandled,
        }
    }

    fn block_render_map(&self) -> Vec<(BlockType, BlockRenderConfig)> {
        vec![(BlockType::Blockquote, BlockRenderConfig::element("aside"))]
    }
}

/// Adds its tag to the pending style after every commit.
struct Tagging(&'static str);

impl Extension for Tagging {
    fn name(&self) -> &str {
        self.0
    }

    fn on_change(&self, state: EditorState) -> EditorState {
        let styles = state.current_inline_style().with(self.0);
        state.set_inline_style_override(styles)
    }
}

/// Declines typed input, counting how often it was asked.
struct Counting(Arc<AtomicUsize>);

impl Extension for Counting {
    fn name(&self) -> &str {
        "counting"
    }

    fn handle_before_input(&self, _chars: &str, _state: &EditorState) -> HandleResult {
        self.0.fetch_add(1, Ordering::SeqCst);
        HandleResult::NotHandled
    }
}

fn editor(extensions: Vec<Box<dyn Extension>>, text: &str) -> Editor {
    Editor::with_document(
        Pipeline::new(extensions),
        Document::from_text(text),
        EditorConfig::default(),
    )
}

#[test]
fn test_merge_rules() {
    let pipeline = Pipeline::new(vec![
        Box::new(Fixed {
            name: "first",
            color: "red",
            class: "one",
        }),
        Box::new(Fixed {
            name: "second",
            color: "blue",
            class: "two",
        }),
    ]);
    let document = Document::from_text("x");
    let block = document.first_block();
    let bold: StyleSet = [BOLD].into_iter().collect();

    let props = pipeline.custom_style(&bold, block);
    assert_eq!(props.get("color").map(SmolStr::as_str), Some("blue"));
    assert_eq!(props.get("fontWeight").map(SmolStr::as_str), Some("bold"));
    assert!(props.contains_key("first"));
    assert!(props.contains_key("second"));

    assert_eq!(pipeline.block_style(block).as_deref(), Some("one two"));

    let state = EditorState::create_with_document(document.clone(), &EditorConfig::default());
    let snapshot = pipeline.render(&state);
    let renderer = snapshot.blocks[0].renderer.as_ref().unwrap();
    assert_eq!(renderer.component, "first");
}

#[test]
fn test_extension_key_binding_and_handler_run_before_core() {
    let mut editor = editor(vec![Box::new(Shouting)], "");
    assert_eq!(
        editor.pipeline().key_binding(&KeyEvent::new("b").with_ctrl()).as_deref(),
        Some("strike")
    );
    // unbound keys still reach the built-in bindings
    assert_eq!(
        editor.pipeline().key_binding(&KeyEvent::new("i").with_meta()).as_deref(),
        Some("italic")
    );

    assert!(editor.handle_key(&KeyEvent::new("b").with_ctrl()).is_handled());
    assert!(editor.insert_text("hey").is_handled());

    let block = editor.state().document().first_block();
    assert_eq!(block.text(), "HEY");
    assert!(block.style_at(0).contains(STRIKETHROUGH));
    assert!(!block.style_at(0).contains(BOLD));
}

#[test]
fn test_panicking_extension_does_not_stop_siblings() {
    let mut editor = editor(
        vec![
            Box::new(Panicking),
            Box::new(Fixed {
                name: "fixed",
                color: "green",
                class: "ok",
            }),
        ],
        "",
    );
    assert_eq!(editor.pipeline().decorator().len(), 1);

    assert!(editor.insert_text("a").is_handled());
    assert!(editor.handle_key(&KeyEvent::new("b").with_ctrl()).is_handled());
    assert_eq!(editor.state().document().plain_text(), "a");

    let snapshot = editor.render();
    let block = &snapshot.blocks[0];
    assert_eq!(block.class_name.as_deref(), Some("ok"));
    assert_eq!(block.spans.len(), 1);
    assert_eq!(block.spans[0].decorator, None);
    assert_eq!(
        block.spans[0].style.get("color").map(SmolStr::as_str),
        Some("green")
    );
}

#[test]
fn test_on_change_folds_in_order() {
    let mut editor = editor(vec![Box::new(Tagging("A")), Box::new(Tagging("B"))], "text");
    assert!(editor.insert_text("!").is_handled());
    let pending = editor.state().inline_style_override().unwrap();
    assert!(pending.contains("A"));
    assert!(pending.contains("B"));
}

#[test]
fn test_render_map_entries_override_defaults() {
    let pipeline = Pipeline::new(vec![Box::new(Shouting)]);
    assert_eq!(pipeline.render_config(&BlockType::Blockquote).element, "aside");
    assert_eq!(pipeline.render_config(&BlockType::HeaderOne).element, "h1");
    assert_eq!(
        pipeline.render_config(&BlockType::Custom("callout".into())).element,
        "div"
    );
}

#[test]
fn test_unhandled_events_leave_state_alone() {
    let mut editor = editor(Vec::new(), "abc");
    let version = editor.version();
    assert!(!editor.handle_key_command("no-such-command").is_handled());
    assert!(!editor.handle_key(&KeyEvent::new("q")).is_handled());
    assert_eq!(editor.version(), version);

    let key = editor.state().document().first_block().key().clone();
    assert!(editor.select(SelectionState::collapsed(key, 1)).is_handled());
    assert_eq!(editor.version(), version + 1);
}

#[test]
fn test_first_handled_result_stops_the_chain() {
    let before = Arc::new(AtomicUsize::new(0));
    let after = Arc::new(AtomicUsize::new(0));
    let mut editor = editor(
        vec![
            Box::new(Counting(Arc::clone(&before))),
            Box::new(Shouting),
            Box::new(Counting(Arc::clone(&after))),
        ],
        "",
    );

    assert!(editor.insert_text("hi").is_handled());
    assert_eq!(editor.state().document().plain_text(), "HI");
    assert_eq!(before.load(Ordering::SeqCst), 1);
    assert_eq!(after.load(Ordering::SeqCst), 0);
}
