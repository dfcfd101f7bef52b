//! Ancestry reconstruction from the flat level sequence.
//!
//! Headline nodes arrive pre-ordered with nothing but an integer level to
//! relate them. A level-indexed stack over an append-only frame arena
//! rebuilds the parent chain: position N on the stack always holds the
//! frame enclosing level N+1. Level skips (a level-1 headline followed
//! directly by a level-3 one) re-push the current top so every node keeps a
//! well-defined ancestor chain.

use std::collections::BTreeMap;

use crate::node::Headline;

/// Identifies a frame within one traversal's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(usize);

/// Reconstructed state for one headline, resolved against its ancestors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlineFrame {
    /// Monotonically increasing id in visitation order. The root sentinel
    /// takes 0; headlines start at 1.
    pub id: usize,
    /// Nearest enclosing headline; `None` for headlines at document root.
    pub parent: Option<FrameId>,
    /// Tags written on this headline itself.
    pub own_tags: Vec<String>,
    /// Ancestor tags followed by own tags, deduplicated first-seen.
    pub inherited_tags: Vec<String>,
    /// Visible title text, folded regions removed.
    pub title: String,
    /// Effort estimate, if any.
    pub effort: Option<String>,
    /// Habit marker.
    pub is_habit: bool,
    /// Resolved category: self → nearest ancestor → document default.
    pub category: Option<String>,
    /// Property drawer entries with ancestors merged in; own entries win.
    pub properties: BTreeMap<String, String>,
    /// Nesting level; 0 only on the root sentinel.
    pub level: u32,
}

/// The ancestry tracker: frame arena plus level-indexed stack.
///
/// Frames are never destroyed while the traversal lives — emitted records
/// may still reference their titles — so the stack holds arena indices and
/// popping only shrinks the index list.
#[derive(Debug)]
pub struct Ancestry {
    frames: Vec<HeadlineFrame>,
    stack: Vec<usize>,
}

impl Ancestry {
    /// Creates a tracker whose root sentinel carries the document-level
    /// default category.
    #[must_use]
    pub fn new(default_category: Option<String>) -> Self {
        let sentinel = HeadlineFrame {
            id: 0,
            parent: None,
            own_tags: Vec::new(),
            inherited_tags: Vec::new(),
            title: String::new(),
            effort: None,
            is_habit: false,
            category: default_category,
            properties: BTreeMap::new(),
            level: 0,
        };
        Self {
            frames: vec![sentinel],
            stack: vec![0],
        }
    }

    /// Visits a headline: rewinds the stack to the headline's level,
    /// resolves inherited attributes against the enclosing frame, and
    /// pushes the new frame.
    pub fn enter(&mut self, headline: &Headline) -> FrameId {
        let level = headline.level.get() as usize;

        // Drop siblings and deeper frames no longer in scope, then re-push
        // the top over any skipped levels so stack depth equals `level`
        // before the new frame lands at position `level`.
        self.stack.truncate(level);
        while self.stack.len() < level {
            let top = *self.stack.last().expect("root sentinel is never popped");
            self.stack.push(top);
        }

        let parent_ix = *self.stack.last().expect("root sentinel is never popped");
        let parent = &self.frames[parent_ix];

        let mut inherited_tags = parent.inherited_tags.clone();
        for tag in &headline.tags {
            if !inherited_tags.contains(tag) {
                inherited_tags.push(tag.clone());
            }
        }

        let category = headline
            .category
            .clone()
            .or_else(|| parent.category.clone());

        let mut properties = parent.properties.clone();
        properties.extend(
            headline
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        let ix = self.frames.len();
        let frame = HeadlineFrame {
            id: ix,
            parent: (parent_ix != 0).then_some(FrameId(parent_ix)),
            own_tags: headline.tags.clone(),
            inherited_tags,
            title: visible_title(&headline.raw_title),
            effort: headline.effort.clone(),
            is_habit: headline.is_habit,
            category,
            properties,
            level: headline.level.get(),
        };
        self.frames.push(frame);
        self.stack.push(ix);
        FrameId(ix)
    }

    /// The frame enclosing the node being visited right now.
    ///
    /// Before any headline has been entered this is the root sentinel.
    #[must_use]
    pub fn current(&self) -> FrameId {
        FrameId(*self.stack.last().expect("root sentinel is never popped"))
    }

    /// Looks up a frame by id.
    #[must_use]
    pub fn frame(&self, id: FrameId) -> &HeadlineFrame {
        &self.frames[id.0]
    }

    /// Titles of the ancestor chain above `id`, farthest ancestor first.
    /// Excludes the frame's own title and the (untitled) root sentinel.
    #[must_use]
    pub fn parent_titles(&self, id: FrameId) -> Vec<String> {
        let mut titles = Vec::new();
        let mut cursor = self.frames[id.0].parent;
        while let Some(parent_id) = cursor {
            let frame = &self.frames[parent_id.0];
            titles.push(frame.title.clone());
            cursor = frame.parent;
        }
        titles.reverse();
        titles
    }
}

/// Extracts the visible portion of a raw title.
///
/// Statistics cookies (`[3/7]`, `[40%]`, and the empty `[/]`, `[%]` forms)
/// are hidden under folding and must not leak into exported rows. Other
/// bracketed text is kept as written.
fn visible_title(raw: &str) -> String {
    let mut visible = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(open) = rest.find('[') {
        let (before, bracketed) = rest.split_at(open);
        visible.push_str(before);
        match bracketed.find(']') {
            Some(close) if is_stats_cookie(&bracketed[1..close]) => {
                rest = &bracketed[close + 1..];
            }
            Some(close) => {
                visible.push_str(&bracketed[..=close]);
                rest = &bracketed[close + 1..];
            }
            None => {
                visible.push_str(bracketed);
                rest = "";
            }
        }
    }
    visible.push_str(rest);
    // Removing a cookie leaves doubled spaces behind; collapse them.
    visible.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_stats_cookie(inner: &str) -> bool {
    if let Some(percent) = inner.strip_suffix('%') {
        return percent.chars().all(|c| c.is_ascii_digit());
    }
    if let Some((done, total)) = inner.split_once('/') {
        return done.chars().all(|c| c.is_ascii_digit())
            && total.chars().all(|c| c.is_ascii_digit());
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Level;

    fn headline(level: u32, title: &str) -> Headline {
        Headline::new(Level::new(level).unwrap(), title)
    }

    fn tagged(level: u32, title: &str, tags: &[&str]) -> Headline {
        let mut h = headline(level, title);
        h.tags = tags.iter().map(ToString::to_string).collect();
        h
    }

    #[test]
    fn ids_increase_in_visitation_order() {
        let mut ancestry = Ancestry::new(None);
        let a = ancestry.enter(&headline(1, "a"));
        let b = ancestry.enter(&headline(2, "b"));
        let c = ancestry.enter(&headline(1, "c"));

        assert_eq!(ancestry.frame(a).id, 1);
        assert_eq!(ancestry.frame(b).id, 2);
        assert_eq!(ancestry.frame(c).id, 3);
    }

    #[test]
    fn parent_is_nearest_shallower_headline() {
        let mut ancestry = Ancestry::new(None);
        let top = ancestry.enter(&headline(1, "top"));
        let child = ancestry.enter(&headline(2, "child"));
        let sibling = ancestry.enter(&headline(2, "sibling"));

        assert_eq!(ancestry.frame(top).parent, None);
        assert_eq!(ancestry.frame(child).parent, Some(top));
        assert_eq!(ancestry.frame(sibling).parent, Some(top));
    }

    #[test]
    fn level_skip_reuses_nearest_frame_as_ancestor() {
        // Level 1 directly to level 3: the synthetic intermediate is the
        // level-1 frame itself, so the deep headline's parent resolves to it.
        let mut ancestry = Ancestry::new(None);
        let top = ancestry.enter(&headline(1, "top"));
        let deep = ancestry.enter(&headline(3, "deep"));

        assert_eq!(ancestry.frame(deep).parent, Some(top));
        assert_eq!(ancestry.parent_titles(deep), vec!["top"]);

        // A later level-2 headline still attaches to the level-1 frame.
        let mid = ancestry.enter(&headline(2, "mid"));
        assert_eq!(ancestry.frame(mid).parent, Some(top));
    }

    #[test]
    fn clock_before_any_headline_sees_the_root() {
        let ancestry = Ancestry::new(Some("default".into()));
        let root = ancestry.current();

        assert_eq!(ancestry.frame(root).id, 0);
        assert_eq!(ancestry.frame(root).parent, None);
        assert!(ancestry.parent_titles(root).is_empty());
        assert_eq!(ancestry.frame(root).category.as_deref(), Some("default"));
    }

    #[test]
    fn inherited_tags_append_without_duplicates() {
        let mut ancestry = Ancestry::new(None);
        ancestry.enter(&tagged(1, "p", &["work", "shared"]));
        let child = ancestry.enter(&tagged(2, "c", &["urgent", "shared", "urgent"]));

        // Ancestor tags first, own tags appended, duplicates dropped on
        // first-seen order.
        assert_eq!(
            ancestry.frame(child).inherited_tags,
            vec!["work", "shared", "urgent"]
        );
        assert_eq!(ancestry.frame(child).own_tags, vec!["urgent", "shared", "urgent"]);
    }

    #[test]
    fn inherited_tags_are_supersets_down_the_path() {
        let mut ancestry = Ancestry::new(None);
        let a = ancestry.enter(&tagged(1, "a", &["x"]));
        let b = ancestry.enter(&tagged(2, "b", &["y"]));

        let parent_tags = ancestry.frame(a).inherited_tags.clone();
        let child_tags = &ancestry.frame(b).inherited_tags;
        assert!(parent_tags.iter().all(|t| child_tags.contains(t)));
    }

    #[test]
    fn category_falls_back_self_then_ancestor_then_default() {
        let mut ancestry = Ancestry::new(Some("doc".into()));

        let mut grandparent = headline(1, "gp");
        grandparent.category = Some("projects".into());
        ancestry.enter(&grandparent);
        ancestry.enter(&headline(2, "p"));
        let leaf = ancestry.enter(&headline(3, "leaf"));

        // Only the grandparent defines a category; the leaf resolves to it.
        assert_eq!(ancestry.frame(leaf).category.as_deref(), Some("projects"));

        let mut own = headline(3, "own");
        own.category = Some("mine".into());
        let own = ancestry.enter(&own);
        assert_eq!(ancestry.frame(own).category.as_deref(), Some("mine"));

        // No headline defines one: document default applies.
        let bare = ancestry.enter(&headline(1, "bare"));
        assert_eq!(ancestry.frame(bare).category.as_deref(), Some("doc"));
    }

    #[test]
    fn properties_merge_with_own_entries_winning() {
        let mut ancestry = Ancestry::new(None);
        let mut parent = headline(1, "p");
        parent.properties.insert("OWNER".into(), "alice".into());
        parent.properties.insert("AREA".into(), "infra".into());
        ancestry.enter(&parent);

        let mut child = headline(2, "c");
        child.properties.insert("OWNER".into(), "bob".into());
        let child = ancestry.enter(&child);

        let props = &ancestry.frame(child).properties;
        assert_eq!(props.get("OWNER").map(String::as_str), Some("bob"));
        assert_eq!(props.get("AREA").map(String::as_str), Some("infra"));
    }

    #[test]
    fn parent_titles_are_farthest_first() {
        let mut ancestry = Ancestry::new(None);
        ancestry.enter(&headline(1, "root"));
        ancestry.enter(&headline(2, "mid"));
        let leaf = ancestry.enter(&headline(3, "leaf"));

        assert_eq!(ancestry.parent_titles(leaf), vec!["root", "mid"]);
    }

    #[test]
    fn visible_title_strips_statistics_cookies() {
        assert_eq!(visible_title("Tasks [2/7]"), "Tasks");
        assert_eq!(visible_title("Tasks [28%] for Q3"), "Tasks for Q3");
        assert_eq!(visible_title("Tasks [/]"), "Tasks");
        assert_eq!(visible_title("Tasks [%]"), "Tasks");
    }

    #[test]
    fn visible_title_keeps_ordinary_brackets() {
        assert_eq!(visible_title("Read [book] notes"), "Read [book] notes");
        assert_eq!(visible_title("Array[0] access"), "Array[0] access");
        assert_eq!(visible_title("half [open"), "half [open");
    }
}
