//! Compiled content models.
//!
//! A [`ContentModel`] is a deterministic automaton over child element names.
//! Schema compilation is out of scope; models are assembled state by state
//! with [`ContentModelBuilder`] or from a flat particle list with
//! [`ContentModel::sequence`].

use core::fmt::Write as _;

use super::{ElementDecl, SchemaError};
use crate::model::ExpandedName;

pub type StateId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessContents {
    /// A global declaration must exist and is validated against.
    Strict,
    /// Validated when a global declaration exists, skipped otherwise.
    Lax,
    /// Never validated.
    Skip,
}

/// `namespace` attribute of a wildcard. `None` stands for "no namespace".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceConstraint {
    /// `##any`
    Any,
    /// `##other` relative to the given target namespace.
    Other(Option<String>),
    /// Explicit list, `None` entries standing for `##local`.
    Only(Vec<Option<String>>),
}

impl NamespaceConstraint {
    pub fn allows(&self, ns: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Other(target) => ns.is_some() && ns != target.as_deref(),
            Self::Only(list) => list.iter().any(|entry| entry.as_deref() == ns),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wildcard {
    pub namespaces: NamespaceConstraint,
    pub process: ProcessContents,
}

impl Wildcard {
    pub fn any(process: ProcessContents) -> Self {
        Self {
            namespaces: NamespaceConstraint::Any,
            process,
        }
    }

    pub fn allows(&self, name: &ExpandedName) -> bool {
        self.namespaces.allows(name.ns_uri.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Particle {
    Element(ElementDecl),
    Wildcard(Wildcard),
}

impl Particle {
    pub fn matches(&self, name: &ExpandedName) -> bool {
        match self {
            Self::Element(decl) => decl.name == *name,
            Self::Wildcard(w) => w.allows(name),
        }
    }

    fn describe(&self, out: &mut String) {
        match self {
            Self::Element(decl) => {
                let _ = write!(out, "'{}'", decl.name);
            }
            Self::Wildcard(w) => match &w.namespaces {
                NamespaceConstraint::Any => out.push_str("any element"),
                NamespaceConstraint::Other(_) => out.push_str("any element from another namespace"),
                NamespaceConstraint::Only(list) => {
                    out.push_str("any element in {");
                    for (i, ns) in list.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        out.push_str(ns.as_deref().unwrap_or("##local"));
                    }
                    out.push('}');
                }
            },
        }
    }
}

/// Cardinality of a particle inside [`ContentModel::sequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurs {
    Once,
    Optional,
    ZeroOrMore,
    OneOrMore,
}

impl Occurs {
    fn is_optional(self) -> bool {
        matches!(self, Self::Optional | Self::ZeroOrMore)
    }

    fn repeats(self) -> bool {
        matches!(self, Self::ZeroOrMore | Self::OneOrMore)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub particle: Particle,
    pub target: StateId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelState {
    pub transitions: Vec<Transition>,
    pub accepting: bool,
}

/// Read-only automaton; state `0` is the start state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentModel {
    states: Vec<ModelState>,
}

impl ContentModel {
    pub const START: StateId = 0;

    /// Model that accepts no children at all.
    pub fn empty() -> Self {
        Self {
            states: vec![ModelState {
                transitions: Vec::new(),
                accepting: true,
            }],
        }
    }

    /// Builds the automaton for a sequence of particles.
    ///
    /// State `k` means "positioned before particle `k`". From there the
    /// automaton may loop on particle `k - 1` when it repeats, and move
    /// forward over particle `k` and every following particle reachable by
    /// skipping optional ones.
    pub fn sequence(items: impl IntoIterator<Item = (Particle, Occurs)>) -> Self {
        let items: Vec<(Particle, Occurs)> = items.into_iter().collect();
        let n = items.len();
        let mut states = Vec::with_capacity(n + 1);
        for k in 0..=n {
            let mut transitions = Vec::new();
            if let Some((prev, occurs)) = k.checked_sub(1).map(|i| &items[i])
                && occurs.repeats()
            {
                transitions.push(Transition {
                    particle: prev.clone(),
                    target: k,
                });
            }
            for (j, (particle, occurs)) in items.iter().enumerate().skip(k) {
                transitions.push(Transition {
                    particle: particle.clone(),
                    target: j + 1,
                });
                if !occurs.is_optional() {
                    break;
                }
            }
            let accepting = items[k..].iter().all(|(_, occurs)| occurs.is_optional());
            states.push(ModelState {
                transitions,
                accepting,
            });
        }
        Self { states }
    }

    pub fn states(&self) -> &[ModelState] {
        &self.states
    }

    /// First transition out of `state` whose particle matches `name`.
    pub fn step(&self, state: StateId, name: &ExpandedName) -> Option<&Transition> {
        self.states
            .get(state)?
            .transitions
            .iter()
            .find(|t| t.particle.matches(name))
    }

    pub fn is_accepting(&self, state: StateId) -> bool {
        self.states.get(state).is_some_and(|s| s.accepting)
    }

    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.states
            .iter()
            .flat_map(|s| s.transitions.iter().map(|t| &t.particle))
    }

    /// Human-readable list of what may follow in `state`, for messages.
    pub fn expected_names(&self, state: StateId) -> String {
        let mut out = String::new();
        let Some(s) = self.states.get(state) else {
            return out;
        };
        let mut seen: Vec<&Particle> = Vec::new();
        for t in &s.transitions {
            if seen.contains(&&t.particle) {
                continue;
            }
            if !seen.is_empty() {
                out.push_str(", ");
            }
            t.particle.describe(&mut out);
            seen.push(&t.particle);
        }
        out
    }
}

/// Assembles a [`ContentModel`] one state at a time.
///
/// ```
/// use xmlbind_engine::model::ExpandedName;
/// use xmlbind_engine::schema::ElementDecl;
/// use xmlbind_engine::schema::content::{ContentModelBuilder, Particle};
///
/// let mut b = ContentModelBuilder::new();
/// let start = b.add_state(false);
/// let done = b.add_state(true);
/// b.add_transition(start, Particle::Element(ElementDecl::new("a", ExpandedName::xs("int"))), done);
/// let model = b.build().unwrap();
/// assert!(model.is_accepting(done));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ContentModelBuilder {
    states: Vec<ModelState>,
    dangling: Option<(StateId, StateId)>,
}

impl ContentModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_state(&mut self, accepting: bool) -> StateId {
        self.states.push(ModelState {
            transitions: Vec::new(),
            accepting,
        });
        self.states.len() - 1
    }

    /// Transitions are tried in insertion order.
    pub fn add_transition(&mut self, from: StateId, particle: Particle, to: StateId) -> &mut Self {
        match self.states.get_mut(from) {
            Some(state) => state.transitions.push(Transition {
                particle,
                target: to,
            }),
            None => {
                self.dangling.get_or_insert((from, to));
            }
        }
        self
    }

    pub fn build(self) -> Result<ContentModel, SchemaError> {
        if self.states.is_empty() {
            return Err(SchemaError::EmptyContentModel);
        }
        if let Some((from, to)) = self.dangling {
            return Err(SchemaError::DanglingTransition { from, to });
        }
        let count = self.states.len();
        for (from, state) in self.states.iter().enumerate() {
            if let Some(t) = state.transitions.iter().find(|t| t.target >= count) {
                return Err(SchemaError::DanglingTransition {
                    from,
                    to: t.target,
                });
            }
        }
        Ok(ContentModel {
            states: self.states,
        })
    }
}
