use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use richtext_core::commands::{insert_characters, toggle_inline_style};
use richtext_core::{BOLD, Document, EditorConfig, EditorState, Pipeline, SelectionState};

fn large_text(block_count: usize) -> String {
    let mut out = String::with_capacity(block_count * 64);
    for i in 0..block_count {
        out.push_str(&format!(
            "{i:06} the quick brown fox jumps over the lazy dog (richtext benchmark block)\n"
        ));
    }
    out.pop();
    out
}

/// Every other block half bold, selection spanning the whole document.
fn styled_state(block_count: usize) -> EditorState {
    let document = Document::from_text(&large_text(block_count));
    let mut state = EditorState::create_with_document(document, &EditorConfig::default());
    let keys: Vec<_> = state
        .document()
        .blocks()
        .iter()
        .step_by(2)
        .map(|block| block.key().clone())
        .collect();
    for key in keys {
        let selection = SelectionState::range(key.clone(), 0, key, 20);
        state = state.accept_selection(selection).unwrap();
        state = toggle_inline_style(&state, BOLD).unwrap();
    }
    let start = state.document().selection_at_start();
    let end = state.document().selection_at_end();
    state
        .accept_selection(SelectionState::range(
            start.anchor_key,
            0,
            end.focus_key,
            end.focus_offset,
        ))
        .unwrap()
}

fn bench_render(c: &mut Criterion) {
    let state = styled_state(5_000);
    let pipeline = Pipeline::default();
    c.bench_function("render/5k_blocks", |b| {
        b.iter(|| black_box(pipeline.render(black_box(&state))))
    });
}

fn bench_style_span(c: &mut Criterion) {
    let state = styled_state(5_000);
    c.bench_function("style_span/5k_blocks", |b| {
        b.iter(|| black_box(state.document().style_span(black_box(state.selection()))))
    });
}

fn bench_typing(c: &mut Criterion) {
    let document = Document::from_text(&large_text(5_000));
    c.bench_function("typing/100_inserts", |b| {
        b.iter_batched(
            || EditorState::create_with_document(document.clone(), &EditorConfig::default()),
            |mut state| {
                for _ in 0..100 {
                    state = insert_characters(&state, "x").unwrap();
                }
                black_box(state)
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_render, bench_style_span, bench_typing);
criterion_main!(benches);
