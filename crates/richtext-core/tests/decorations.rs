use pretty_assertions::assert_eq;
use richtext_core::{
    Block, Decorator, Document, EditorConfig, EditorState, Extension, Mutability, Pipeline,
};
use std::ops::Range;

/// Decorates every occurrence of a word.
struct Highlight {
    component: &'static str,
    word: &'static str,
}

impl Extension for Highlight {
    fn name(&self) -> &str {
        self.component
    }

    fn decorators(&self) -> Vec<Decorator> {
        let word = self.word;
        vec![Decorator::new(self.component, move |block: &Block, _: &Document| {
            let chars: Vec<char> = block.text().chars().collect();
            let needle: Vec<char> = word.chars().collect();
            let mut ranges: Vec<Range<usize>> = Vec::new();
            if needle.is_empty() || needle.len() > chars.len() {
                return ranges;
            }
            for start in 0..=chars.len() - needle.len() {
                if chars[start..start + needle.len()] == needle[..] {
                    ranges.push(start..start + needle.len());
                }
            }
            ranges
        })]
    }
}

fn render_text(pipeline: &Pipeline, text: &str) -> Vec<(String, Option<String>)> {
    let state =
        EditorState::create_with_document(Document::from_text(text), &EditorConfig::default());
    pipeline.render(&state).blocks[0]
        .spans
        .iter()
        .map(|span| {
            (
                span.text.clone(),
                span.decorator.as_ref().map(|component| component.to_string()),
            )
        })
        .collect()
}

#[test]
fn test_earlier_extension_claims_overlapping_characters() {
    let pipeline = Pipeline::new(vec![
        Box::new(Highlight {
            component: "tag",
            word: "#rust",
        }),
        Box::new(Highlight {
            component: "word",
            word: "rust",
        }),
    ]);
    assert_eq!(
        render_text(&pipeline, "#rust and rust"),
        vec![
            ("#rust".to_string(), Some("tag".to_string())),
            (" and ".to_string(), None),
            ("rust".to_string(), Some("word".to_string())),
        ]
    );
}

#[test]
fn test_decorator_owner_is_recorded() {
    let pipeline = Pipeline::new(vec![Box::new(Highlight {
        component: "word",
        word: "x",
    })]);
    assert_eq!(pipeline.decorator().len(), 1);
    assert!(!pipeline.decorator().is_empty());
}

#[test]
fn test_entity_type_decorator_follows_entity_runs() {
    let document = Document::from_text("ab");
    let (document, link) = document.create_entity("LINK", Mutability::Mutable, Default::default());
    let key = document.first_block().key().clone();
    let selection = richtext_core::SelectionState::range(key.clone(), 2, key, 2);
    let (document, _) = document
        .insert_text(&selection, "cd", &Default::default(), Some(&link))
        .unwrap();

    let pipeline = Pipeline::new(vec![Box::new(LinkExtension)]);
    let state = EditorState::create_with_document(document, &EditorConfig::default());
    let spans = &pipeline.render(&state).blocks[0].spans;
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[1].text, "cd");
    assert_eq!(spans[1].decorator.as_deref(), Some("link"));
    assert_eq!(spans[1].entity.as_ref(), Some(&link));
}

struct LinkExtension;

impl Extension for LinkExtension {
    fn decorators(&self) -> Vec<Decorator> {
        vec![Decorator::for_entity_type("link", "LINK")]
    }
}
