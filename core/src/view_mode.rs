//! Navigation state: one current view, either static or bound to a target.
//!
//! # Design
//! A view is `Static(tag)` when the screen needs no parameter and
//! `Dynamic { kind, target }` when it shows one resource. The two tag sets are
//! separate types, so a target can never be attached to a static tag.
//!
//! `ViewModeMachine` additionally carries the tag sets declared for one
//! application instance. A transition to a tag outside those sets is dropped
//! and the current view is kept. The same rule applies to the untyped wire
//! form, [`RawViewMode`], where unknown tag strings are dropped too; that lets
//! an older client ignore views introduced by a newer peer.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A closed set of view identifiers.
pub trait ViewTag: Copy + Eq + fmt::Debug + 'static {
    /// Every tag of the set.
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    fn parse(tag: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.as_str() == tag)
    }
}

/// The current navigation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMode<S, D> {
    Static(S),
    Dynamic { kind: D, target: String },
}

impl<S: ViewTag, D: ViewTag> ViewMode<S, D> {
    pub fn dynamic(kind: D, target: impl Into<String>) -> Self {
        ViewMode::Dynamic {
            kind,
            target: target.into(),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, ViewMode::Dynamic { .. })
    }

    /// The bound resource id. Only dynamic views have one.
    pub fn target(&self) -> Option<&str> {
        match self {
            ViewMode::Static(_) => None,
            ViewMode::Dynamic { target, .. } => Some(target),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ViewMode::Static(tag) => tag.as_str(),
            ViewMode::Dynamic { kind, .. } => kind.as_str(),
        }
    }

    pub fn to_raw(&self) -> RawViewMode {
        RawViewMode {
            kind: self.tag().to_string(),
            target: self.target().map(str::to_string),
        }
    }

    /// Parse the wire form. The presence of `target` decides which tag set is
    /// consulted, so `{type: "none", target: "x"}` is not a view.
    pub fn from_raw(raw: &RawViewMode) -> Option<Self> {
        match &raw.target {
            None => S::parse(&raw.kind).map(ViewMode::Static),
            Some(target) => {
                let kind = D::parse(&raw.kind)?;
                Some(ViewMode::dynamic(kind, target.as_str()))
            }
        }
    }
}

impl<S: ViewTag, D: ViewTag> fmt::Display for ViewMode<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Static(tag) => write!(f, "{}", tag.as_str()),
            ViewMode::Dynamic { kind, target } => write!(f, "{}:{target}", kind.as_str()),
        }
    }
}

/// Untyped view as exchanged with the outside: `{"type": .., "target": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawViewMode {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Holds exactly one current `ViewMode` and guards every transition.
#[derive(Debug, Clone)]
pub struct ViewModeMachine<S, D> {
    current: ViewMode<S, D>,
    static_tags: Vec<S>,
    dynamic_tags: Vec<D>,
}

impl<S: ViewTag, D: ViewTag> ViewModeMachine<S, D> {
    /// Start in `initial`, accepting only the given tags afterwards.
    ///
    /// `initial` is always accepted, even if missing from `static_tags`.
    pub fn new(initial: S, static_tags: &[S], dynamic_tags: &[D]) -> Self {
        let mut static_tags = static_tags.to_vec();
        if !static_tags.contains(&initial) {
            static_tags.push(initial);
        }
        Self {
            current: ViewMode::Static(initial),
            static_tags,
            dynamic_tags: dynamic_tags.to_vec(),
        }
    }

    pub fn current(&self) -> &ViewMode<S, D> {
        &self.current
    }

    /// Whether `mode` belongs to the declared tag sets.
    pub fn accepts(&self, mode: &ViewMode<S, D>) -> bool {
        match mode {
            ViewMode::Static(tag) => self.static_tags.contains(tag),
            ViewMode::Dynamic { kind, .. } => self.dynamic_tags.contains(kind),
        }
    }

    /// Replace the current view with `next` if it is declared.
    ///
    /// An undeclared view is ignored and `false` is returned; the current
    /// view is left as it was.
    pub fn change(&mut self, next: ViewMode<S, D>) -> bool {
        if !self.accepts(&next) {
            debug!(view = %next, "ignoring undeclared view transition");
            return false;
        }
        debug!(from = %self.current, to = %next, "view changed");
        self.current = next;
        true
    }

    /// Like [`change`](Self::change), for the wire form.
    pub fn change_raw(&mut self, next: &RawViewMode) -> bool {
        match ViewMode::from_raw(next) {
            Some(mode) => self.change(mode),
            None => {
                debug!(view = ?next, "ignoring unknown view transition");
                false
            }
        }
    }

    /// True when the current view is dynamic and bound to `id`.
    pub fn is_target(&self, id: &str) -> bool {
        self.current.target() == Some(id)
    }
}

/// Screens that need no parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentView {
    None,
    Create,
    Error,
}

impl ViewTag for ContentView {
    const ALL: &'static [Self] = &[ContentView::None, ContentView::Create, ContentView::Error];

    fn as_str(self) -> &'static str {
        match self {
            ContentView::None => "none",
            ContentView::Create => "create",
            ContentView::Error => "error",
        }
    }
}

/// Screens bound to one todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemView {
    Item,
    Edit,
}

impl ViewTag for ItemView {
    const ALL: &'static [Self] = &[ItemView::Item, ItemView::Edit];

    fn as_str(self) -> &'static str {
        match self {
            ItemView::Item => "item",
            ItemView::Edit => "edit",
        }
    }
}

pub type ContentViewMode = ViewMode<ContentView, ItemView>;

pub type ContentViewMachine = ViewModeMachine<ContentView, ItemView>;

impl ContentViewMachine {
    /// The todo application's machine: starts at `none`, every tag declared.
    pub fn for_content() -> Self {
        ViewModeMachine::new(ContentView::None, ContentView::ALL, ItemView::ALL)
    }
}
