//! Decorators: render-time annotations over character ranges.
//!
//! A [`Decorator`] pairs a component name with a strategy that finds ranges inside a block
//! (for example every character whose entity is an inline image). Decorators do not modify the
//! document; the [`CompositeDecorator`] resolves them per block for the render snapshot.
//!
//! Overlap policy: decorators are consulted in registration order and claim characters. A later
//! range that overlaps an already-claimed character is dropped as a whole.

use crate::document::{Block, Document};
use crate::plugin::guarded;
use smol_str::SmolStr;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Strategy returning the decorated character ranges of a block.
pub type DecoratorStrategy = Arc<dyn Fn(&Block, &Document) -> Vec<Range<usize>> + Send + Sync>;

/// A component plus the strategy deciding where it applies.
#[derive(Clone)]
pub struct Decorator {
    component: SmolStr,
    owner: SmolStr,
    strategy: DecoratorStrategy,
}

impl Decorator {
    /// Create a decorator from a strategy closure.
    pub fn new(
        component: impl Into<SmolStr>,
        strategy: impl Fn(&Block, &Document) -> Vec<Range<usize>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            component: component.into(),
            owner: SmolStr::default(),
            strategy: Arc::new(strategy),
        }
    }

    /// A decorator over every run of characters whose entity has `entity_type`.
    pub fn for_entity_type(component: impl Into<SmolStr>, entity_type: impl Into<SmolStr>) -> Self {
        let entity_type = entity_type.into();
        Self::new(component, move |block, document| {
            block.find_entity_ranges(|key| {
                document
                    .entity(key)
                    .is_some_and(|entity| entity.entity_type() == entity_type)
            })
        })
    }

    /// Component name given to decorated spans.
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Name of the extension that contributed this decorator.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub(crate) fn with_owner(mut self, owner: &str) -> Self {
        self.owner = SmolStr::new(owner);
        self
    }

    /// Run the strategy.
    pub fn ranges(&self, block: &Block, document: &Document) -> Vec<Range<usize>> {
        (self.strategy)(block, document)
    }
}

impl fmt::Debug for Decorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decorator")
            .field("component", &self.component)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

/// One resolved decoration inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratedRange {
    /// Character range.
    pub range: Range<usize>,
    /// Component name.
    pub component: SmolStr,
}

/// All decorators of a pipeline, resolved together.
#[derive(Debug, Clone, Default)]
pub struct CompositeDecorator {
    decorators: Vec<Decorator>,
}

impl CompositeDecorator {
    /// Compose `decorators` in priority order.
    pub fn new(decorators: Vec<Decorator>) -> Self {
        Self { decorators }
    }

    /// Number of decorators.
    pub fn len(&self) -> usize {
        self.decorators.len()
    }

    /// Whether there are no decorators.
    pub fn is_empty(&self) -> bool {
        self.decorators.is_empty()
    }

    /// Non-overlapping decorated ranges of `block`, sorted by start.
    ///
    /// Empty or out-of-bounds ranges and panicking strategies are logged and skipped.
    pub fn decorate(&self, block: &Block, document: &Document) -> Vec<DecoratedRange> {
        let mut claimed = vec![false; block.len()];
        let mut resolved = Vec::new();
        for decorator in &self.decorators {
            let Some(ranges) = guarded(decorator.owner(), "decorator", || {
                decorator.ranges(block, document)
            }) else {
                continue;
            };
            for range in ranges {
                if range.start >= range.end || range.end > block.len() {
                    tracing::error!(
                        extension = decorator.owner(),
                        component = decorator.component(),
                        block = %block.key(),
                        start = range.start,
                        end = range.end,
                        "decorator range out of bounds; skipped"
                    );
                    continue;
                }
                if claimed[range.clone()].iter().any(|taken| *taken) {
                    tracing::trace!(
                        component = decorator.component(),
                        start = range.start,
                        end = range.end,
                        "overlapping decorator range dropped"
                    );
                    continue;
                }
                claimed[range.clone()].fill(true);
                resolved.push(DecoratedRange {
                    range,
                    component: decorator.component.clone(),
                });
            }
        }
        resolved.sort_by_key(|decorated| decorated.range.start);
        resolved
    }
}
