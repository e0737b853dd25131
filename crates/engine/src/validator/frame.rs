use smallvec::SmallVec;

use crate::model::{ExpandedName, Location};
use crate::schema::ContentType;
use crate::schema::builtins::any_type;
use crate::schema::content::{ContentModel, StateId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameKind {
    Document,
    Element,
    /// Rejected or skipped subtree; only BEGIN/END pairing is tracked.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    AwaitingAttrs,
    ValidatingContent,
}

/// One open element (or the document itself) on the validator stack.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub kind: FrameKind,
    pub phase: Phase,
    pub name: Option<ExpandedName>,
    /// Effective type, after `xsi:type`.
    pub type_name: ExpandedName,
    pub content: ContentType,
    pub state: StateId,
    pub nilled: bool,
    /// Set once a content error has been reported for this frame.
    pub reported: bool,
    pub root_seen: bool,
    /// Accumulated text of simple content.
    pub text: String,
    pub seen_attrs: SmallVec<[ExpandedName; 4]>,
    pub location: Location,
}

impl Frame {
    fn new(kind: FrameKind, location: Location) -> Self {
        Self {
            kind,
            phase: Phase::AwaitingAttrs,
            name: None,
            type_name: any_type(),
            content: ContentType::Any,
            state: ContentModel::START,
            nilled: false,
            reported: false,
            root_seen: false,
            text: String::new(),
            seen_attrs: SmallVec::new(),
            location,
        }
    }

    pub fn document(location: Location) -> Self {
        Self::new(FrameKind::Document, location)
    }

    pub fn skipped(location: Location) -> Self {
        Self {
            phase: Phase::ValidatingContent,
            ..Self::new(FrameKind::Skipped, location)
        }
    }

    pub fn element(
        name: ExpandedName,
        type_name: ExpandedName,
        content: ContentType,
        nilled: bool,
        location: Location,
    ) -> Self {
        Self {
            name: Some(name),
            type_name,
            content,
            nilled,
            ..Self::new(FrameKind::Element, location)
        }
    }

    /// Display name for messages.
    pub fn label(&self) -> String {
        match (&self.kind, &self.name) {
            (FrameKind::Document, _) => "the document".to_owned(),
            (_, Some(name)) => format!("element '{name}'"),
            (_, None) => "an unnamed element".to_owned(),
        }
    }
}
