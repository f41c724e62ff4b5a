use pretty_assertions::assert_eq;
use richtext_core::{
    Document, Editor, EditorConfig, EditorHandle, FileBlob, FileReadError, FileReader,
    SelectionState,
};
use richtext_core_formatting::default_pipeline;
use richtext_core_formatting::inline_image::{INLINE_IMAGE, ImageData, image_at};
use smol_str::SmolStr;
use std::collections::HashMap;
use std::time::Duration;

/// Serves file contents from memory, optionally after a delay.
#[derive(Default)]
struct MemoryReader {
    contents: HashMap<SmolStr, Vec<u8>>,
    delay: Option<Duration>,
}

impl MemoryReader {
    fn with(mut self, name: &str, bytes: &[u8]) -> Self {
        self.contents.insert(SmolStr::new(name), bytes.to_vec());
        self
    }

    fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl FileReader for MemoryReader {
    async fn read(&self, file: &FileBlob) -> Result<Vec<u8>, FileReadError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.contents
            .get(&file.name)
            .cloned()
            .ok_or_else(|| FileReadError::Aborted(file.name.clone()))
    }
}

fn handle_at_end(text: &str) -> EditorHandle {
    let mut editor = Editor::with_document(
        default_pipeline(),
        Document::from_text(text),
        EditorConfig::default(),
    );
    let end = editor.state().document().selection_at_end();
    editor.select(end);
    EditorHandle::new(editor)
}

fn png(name: &str) -> FileBlob {
    FileBlob::new(name, "image/png")
}

fn image_sources(handle: &EditorHandle) -> Vec<String> {
    let editor = handle.borrow();
    let state = editor.state();
    let block = state.document().first_block();
    (0..block.len())
        .filter_map(|offset| block.entity_at(offset))
        .filter_map(|key| image_at(state, key))
        .map(|data| data.src)
        .collect()
}

#[tokio::test]
async fn test_pasted_images_are_inserted_in_order() {
    let handle = handle_at_end("ab");
    let reader = MemoryReader::default().with("a.png", b"A").with("b.png", b"B");

    let pending = handle
        .paste_files(vec![png("a.png"), png("b.png")], reader)
        .expect("png files are deferred");
    assert_eq!(pending.await, 2);

    assert_eq!(
        image_sources(&handle),
        vec![
            ImageData::from_bytes("image/png", b"A").src,
            ImageData::from_bytes("image/png", b"B").src,
        ]
    );
    let editor = handle.borrow();
    let block = editor.state().document().first_block();
    assert_eq!(block.len(), 4);
    assert_eq!(editor.state().selection().focus_offset, 4);
}

#[tokio::test]
async fn test_failed_read_skips_only_that_file() {
    let handle = handle_at_end("");
    let reader = MemoryReader::default().with("b.png", b"B");

    let pending = handle
        .paste_files(vec![png("missing.png"), png("b.png")], reader)
        .expect("png files are deferred");
    assert_eq!(pending.await, 1);
    assert_eq!(
        image_sources(&handle),
        vec![ImageData::from_bytes("image/png", b"B").src]
    );
}

#[tokio::test]
async fn test_unmount_discards_in_flight_reads() {
    let handle = handle_at_end("ab");
    let reader = MemoryReader::default().with("a.png", b"A");

    let pending = handle
        .paste_files(vec![png("a.png")], reader)
        .expect("png files are deferred");
    handle.borrow_mut().unmount();

    assert_eq!(pending.await, 0);
    assert_eq!(handle.borrow().state().document().plain_text(), "ab");
}

#[tokio::test]
async fn test_dropped_editor_discards_in_flight_reads() {
    let handle = handle_at_end("ab");
    let reader = MemoryReader::default().with("a.png", b"A");

    let pending = handle
        .paste_files(vec![png("a.png")], reader)
        .expect("png files are deferred");
    drop(handle);

    assert_eq!(pending.await, 0);
}

#[tokio::test]
async fn test_rejected_types_are_not_handled() {
    let handle = handle_at_end("ab");
    let files = vec![
        FileBlob::new("notes.txt", "text/plain"),
        FileBlob::new("anim.gif", "image/gif"),
    ];
    assert!(handle.paste_files(files, MemoryReader::default()).is_none());
    assert_eq!(handle.borrow().version(), 1);
}

#[tokio::test]
async fn test_mixed_files_insert_only_images() {
    let handle = handle_at_end("");
    let reader = MemoryReader::default()
        .with("notes.txt", b"hello")
        .with("photo.jpg", b"J");
    let files = vec![
        FileBlob::new("notes.txt", "text/plain"),
        FileBlob::new("photo.jpg", "image/jpeg"),
    ];

    let pending = handle.paste_files(files, reader).expect("one image accepted");
    assert_eq!(pending.await, 1);
    assert_eq!(
        image_sources(&handle),
        vec![ImageData::from_bytes("image/jpeg", b"J").src]
    );
}

#[tokio::test]
async fn test_drop_inserts_first_image_at_drop_point() {
    let handle = handle_at_end("abcd");
    let key = handle.borrow().state().document().first_block().key().clone();
    let reader = MemoryReader::default().with("a.png", b"A").with("b.png", b"B");

    let pending = handle
        .drop_files(
            &SelectionState::collapsed(key, 1),
            vec![png("a.png"), png("b.png")],
            reader,
        )
        .expect("png files are deferred");
    assert_eq!(pending.await, 2);

    let editor = handle.borrow();
    let document = editor.state().document();
    let block = document.first_block();
    assert_eq!(block.len(), 6);
    for offset in [1, 2] {
        let entity = block.entity_at(offset).expect("image placeholder");
        assert_eq!(
            document.entity(entity).map(|entity| entity.entity_type()),
            Some(INLINE_IMAGE)
        );
    }
    assert_eq!(block.text().chars().next(), Some('a'));
    assert_eq!(block.text().chars().last(), Some('d'));
}

#[tokio::test]
async fn test_reads_apply_to_latest_state() {
    let handle = handle_at_end("ab");
    let reader = MemoryReader::default()
        .with("a.png", b"A")
        .delayed(Duration::from_millis(40));

    let pending = handle
        .paste_files(vec![png("a.png")], reader)
        .expect("png files are deferred");
    let typing = {
        let handle = handle.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            handle.borrow_mut().insert_text("x");
        }
    };
    let (applied, ()) = tokio::join!(pending, typing);
    assert_eq!(applied, 1);

    let editor = handle.borrow();
    let block = editor.state().document().first_block();
    assert!(block.text().starts_with("abx"));
    assert!(block.entity_at(3).is_some());
}
