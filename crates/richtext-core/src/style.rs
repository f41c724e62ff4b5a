//! Inline style tags, style sets and style families.
//!
//! Characters carry a set of opaque style tags (`"BOLD"`, `"color-#ff0000"`, `"font-size-18"`).
//! Tags are resolved into visual properties by the style classifiers contributed through the
//! plugin pipeline; the built-in classifier handles the core tags defined here.

use serde::{Deserialize, Serialize};
use smol_str::{SmolStr, format_smolstr};
use std::collections::{BTreeMap, BTreeSet};

/// Bold inline style tag.
pub const BOLD: &str = "BOLD";
/// Italic inline style tag.
pub const ITALIC: &str = "ITALIC";
/// Underline inline style tag.
pub const UNDERLINE: &str = "UNDERLINE";
/// Inline code style tag.
pub const CODE: &str = "CODE";
/// Strikethrough inline style tag.
pub const STRIKETHROUGH: &str = "STRIKETHROUGH";

/// Visual style properties produced by style classifiers (CSS-like property -> value).
pub type StyleProps = BTreeMap<SmolStr, SmolStr>;

/// An ordered set of style tags applied to one character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleSet(BTreeSet<SmolStr>);

/// The empty style set, shared by lookups that fall outside a block.
pub(crate) static EMPTY_STYLE: StyleSet = StyleSet::new();

impl StyleSet {
    /// Create an empty style set.
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Whether `tag` is part of the set.
    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set has no tags.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate tags in order.
    pub fn iter(&self) -> impl Iterator<Item = &SmolStr> {
        self.0.iter()
    }

    /// Add a tag in place. Returns `false` if it was already present.
    pub fn insert(&mut self, tag: impl Into<SmolStr>) -> bool {
        self.0.insert(tag.into())
    }

    /// Remove a tag in place. Returns `false` if it was absent.
    pub fn remove(&mut self, tag: &str) -> bool {
        self.0.remove(tag)
    }

    /// Copy of this set with `tag` added.
    pub fn with(&self, tag: impl Into<SmolStr>) -> Self {
        let mut next = self.clone();
        next.insert(tag);
        next
    }

    /// Copy of this set with `tag` removed.
    pub fn without(&self, tag: &str) -> Self {
        let mut next = self.clone();
        next.remove(tag);
        next
    }

    /// Add every tag of `other`.
    pub fn extend_from(&mut self, other: &StyleSet) {
        self.0.extend(other.0.iter().cloned());
    }

    /// Drop every tag that belongs to `family`.
    pub fn retain_outside(&mut self, family: StyleFamily) {
        self.0.retain(|tag| !family.contains(tag));
    }
}

impl<T: Into<SmolStr>> FromIterator<T> for StyleSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a StyleSet {
    type Item = &'a SmolStr;
    type IntoIter = std::collections::btree_set::Iter<'a, SmolStr>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A single-value style family: tags sharing a prefix where at most one may be active per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleFamily {
    prefix: &'static str,
}

impl StyleFamily {
    /// Text color (`color-<css color>`).
    pub const COLOR: Self = Self::new("color-");
    /// Font size (`font-size-<size>`).
    pub const FONT_SIZE: Self = Self::new("font-size-");

    /// Define a family by its tag prefix.
    pub const fn new(prefix: &'static str) -> Self {
        Self { prefix }
    }

    /// The tag prefix.
    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    /// Whether `tag` belongs to this family.
    pub fn contains(&self, tag: &str) -> bool {
        tag.starts_with(self.prefix)
    }

    /// Build the tag carrying `value`.
    pub fn tag(&self, value: &str) -> SmolStr {
        format_smolstr!("{}{}", self.prefix, value)
    }

    /// Extract the value of a tag of this family.
    pub fn value_of<'a>(&self, tag: &'a str) -> Option<&'a str> {
        tag.strip_prefix(self.prefix)
    }

    /// The value of the first tag of this family in `styles`.
    pub fn find<'a>(&self, styles: &'a StyleSet) -> Option<&'a str> {
        styles.iter().find_map(|tag| self.value_of(tag))
    }

    /// Every tag of this family in `styles`.
    pub fn members<'a>(&self, styles: &'a StyleSet) -> impl Iterator<Item = &'a SmolStr> + 'a {
        let family = *self;
        styles.iter().filter(move |tag| family.contains(tag))
    }
}

/// The built-in style classifier for the core tags.
pub fn default_style_props(styles: &StyleSet) -> StyleProps {
    let mut props = StyleProps::new();
    let mut decorations: Vec<&str> = Vec::new();
    for tag in styles {
        match tag.as_str() {
            BOLD => {
                props.insert("fontWeight".into(), "bold".into());
            }
            ITALIC => {
                props.insert("fontStyle".into(), "italic".into());
            }
            CODE => {
                props.insert("fontFamily".into(), "monospace".into());
                props.insert("wordWrap".into(), "break-word".into());
            }
            UNDERLINE => decorations.push("underline"),
            STRIKETHROUGH => decorations.push("line-through"),
            _ => {}
        }
    }
    if !decorations.is_empty() {
        props.insert("textDecoration".into(), decorations.join(" ").into());
    }
    props
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_tag_roundtrip() {
        let tag = StyleFamily::COLOR.tag("#ff0000");
        assert_eq!(tag, "color-#ff0000");
        assert_eq!(StyleFamily::COLOR.value_of(&tag), Some("#ff0000"));
        assert!(!StyleFamily::FONT_SIZE.contains(&tag));
    }

    #[test]
    fn test_retain_outside_family() {
        let mut styles: StyleSet = [BOLD, "color-red", "font-size-18"].into_iter().collect();
        styles.retain_outside(StyleFamily::COLOR);
        assert!(styles.contains(BOLD));
        assert!(styles.contains("font-size-18"));
        assert_eq!(StyleFamily::COLOR.find(&styles), None);
    }

    #[test]
    fn test_default_props_combine_decorations() {
        let styles: StyleSet = [UNDERLINE, STRIKETHROUGH, BOLD].into_iter().collect();
        let props = default_style_props(&styles);
        assert_eq!(props.get("fontWeight").map(SmolStr::as_str), Some("bold"));
        assert_eq!(
            props.get("textDecoration").map(SmolStr::as_str),
            Some("underline line-through")
        );
    }
}
