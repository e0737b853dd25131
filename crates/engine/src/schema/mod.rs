//! Already-compiled schema components consumed by the validator.
//!
//! A [`SchemaSet`] always contains the built-in XSD types. User components
//! are added through [`SchemaBuilder`], which checks every type reference
//! when the set is built.

pub mod builtins;
pub mod content;

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use self::content::{ContentModel, Particle, StateId, Wildcard};
use crate::model::ExpandedName;
use crate::whitespace::WhitespaceMode;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{owner} refers to unknown type {type_name}")]
    UnknownType {
        owner: ExpandedName,
        type_name: ExpandedName,
    },
    #[error("type {0} is defined more than once")]
    DuplicateType(ExpandedName),
    #[error("element {0} is declared more than once")]
    DuplicateElement(ExpandedName),
    #[error("attribute {0} is declared more than once")]
    DuplicateAttribute(ExpandedName),
    #[error("{owner} requires a simple type but {type_name} is complex")]
    NotSimple {
        owner: ExpandedName,
        type_name: ExpandedName,
    },
    #[error("derivation of {0} is circular")]
    CircularDerivation(ExpandedName),
    #[error("content model has no states")]
    EmptyContentModel,
    #[error("transition from state {from} targets missing state {to}")]
    DanglingTransition { from: StateId, to: StateId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleTypeDef {
    pub name: ExpandedName,
    /// `None` only for `xs:anySimpleType`'s parent chain root.
    pub base: Option<ExpandedName>,
    /// Declared `whiteSpace` facet, if any.
    pub whitespace: Option<WhitespaceMode>,
}

impl SimpleTypeDef {
    pub fn new(name: impl Into<ExpandedName>, base: ExpandedName) -> Self {
        Self {
            name: name.into(),
            base: Some(base),
            whitespace: None,
        }
    }

    #[must_use]
    pub fn with_whitespace(mut self, mode: WhitespaceMode) -> Self {
        self.whitespace = Some(mode);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentType {
    Empty,
    /// Text only, typed by the named simple type.
    Simple(ExpandedName),
    ElementOnly(Arc<ContentModel>),
    Mixed(Arc<ContentModel>),
    /// `xs:anyType`: any attributes, any text, any children (lax).
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeUse {
    pub name: ExpandedName,
    pub type_name: ExpandedName,
    pub required: bool,
    /// Value constraint compared against the normalized lexical form.
    pub fixed: Option<String>,
}

impl AttributeUse {
    pub fn optional(name: impl Into<ExpandedName>, type_name: ExpandedName) -> Self {
        Self {
            name: name.into(),
            type_name,
            required: false,
            fixed: None,
        }
    }

    pub fn required(name: impl Into<ExpandedName>, type_name: ExpandedName) -> Self {
        Self {
            required: true,
            ..Self::optional(name, type_name)
        }
    }

    #[must_use]
    pub fn with_fixed(mut self, value: impl Into<String>) -> Self {
        self.fixed = Some(value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexTypeDef {
    pub name: ExpandedName,
    pub base: Option<ExpandedName>,
    pub attributes: Vec<AttributeUse>,
    pub attribute_wildcard: Option<Wildcard>,
    pub content: ContentType,
}

impl ComplexTypeDef {
    /// Complex type restricting `xs:anyType`.
    pub fn new(name: impl Into<ExpandedName>, content: ContentType) -> Self {
        Self {
            name: name.into(),
            base: Some(builtins::any_type()),
            attributes: Vec::new(),
            attribute_wildcard: None,
            content,
        }
    }

    #[must_use]
    pub fn with_base(mut self, base: ExpandedName) -> Self {
        self.base = Some(base);
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, attr: AttributeUse) -> Self {
        self.attributes.push(attr);
        self
    }

    #[must_use]
    pub fn with_attribute_wildcard(mut self, wildcard: Wildcard) -> Self {
        self.attribute_wildcard = Some(wildcard);
        self
    }

    pub fn attribute(&self, name: &ExpandedName) -> Option<&AttributeUse> {
        self.attributes.iter().find(|a| a.name == *name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDef {
    Simple(SimpleTypeDef),
    Complex(ComplexTypeDef),
}

impl TypeDef {
    pub fn name(&self) -> &ExpandedName {
        match self {
            Self::Simple(t) => &t.name,
            Self::Complex(t) => &t.name,
        }
    }

    pub fn base(&self) -> Option<&ExpandedName> {
        match self {
            Self::Simple(t) => t.base.as_ref(),
            Self::Complex(t) => t.base.as_ref(),
        }
    }
}

/// Element declaration, global or local to a content model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDecl {
    pub name: ExpandedName,
    pub type_name: ExpandedName,
    pub nillable: bool,
}

impl ElementDecl {
    pub fn new(name: impl Into<ExpandedName>, type_name: ExpandedName) -> Self {
        Self {
            name: name.into(),
            type_name,
            nillable: false,
        }
    }

    #[must_use]
    pub fn nillable(mut self) -> Self {
        self.nillable = true;
        self
    }
}

/// Global attribute declaration, used by attribute wildcards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDecl {
    pub name: ExpandedName,
    pub type_name: ExpandedName,
}

impl AttributeDecl {
    pub fn new(name: impl Into<ExpandedName>, type_name: ExpandedName) -> Self {
        Self {
            name: name.into(),
            type_name,
        }
    }
}

/// Immutable set of schema components, shared between validators via `Arc`.
#[derive(Debug, Clone)]
pub struct SchemaSet {
    types: HashMap<ExpandedName, TypeDef>,
    elements: HashMap<ExpandedName, ElementDecl>,
    attributes: HashMap<ExpandedName, AttributeDecl>,
}

impl Default for SchemaSet {
    fn default() -> Self {
        Self::builtins_only()
    }
}

impl SchemaSet {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Schema with the built-in types and no declarations.
    pub fn builtins_only() -> Self {
        Self {
            types: builtins::types()
                .into_iter()
                .map(|t| (t.name().clone(), t))
                .collect(),
            elements: HashMap::new(),
            attributes: HashMap::new(),
        }
    }

    pub fn get_type(&self, name: &ExpandedName) -> Option<&TypeDef> {
        self.types.get(name)
    }

    pub fn element(&self, name: &ExpandedName) -> Option<&ElementDecl> {
        self.elements.get(name)
    }

    pub fn attribute(&self, name: &ExpandedName) -> Option<&AttributeDecl> {
        self.attributes.get(name)
    }

    /// `name` followed by its ancestors, ending with `xs:anyType`.
    pub fn base_chain<'s>(&'s self, name: &'s ExpandedName) -> impl Iterator<Item = &'s ExpandedName> {
        // build() rejects cycles, the bound only guards hand-edited sets
        let limit = self.types.len() + 1;
        core::iter::successors(Some(name), move |n| self.types.get(*n).and_then(TypeDef::base))
            .take(limit)
    }

    /// Whether `derived` equals `base` or reaches it through its base chain.
    /// Every type is derived from `xs:anyType`.
    pub fn is_derived_from(&self, derived: &ExpandedName, base: &ExpandedName) -> bool {
        *base == builtins::any_type() || self.base_chain(derived).any(|n| n == base)
    }

    /// First declared `whiteSpace` facet along the simple base chain.
    pub fn whitespace_facet(&self, name: &ExpandedName) -> Option<WhitespaceMode> {
        self.base_chain(name)
            .find_map(|n| match self.types.get(n) {
                Some(TypeDef::Simple(t)) => t.whitespace,
                _ => None,
            })
    }
}

/// Collects user components and validates references on [`build`](Self::build).
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    types: Vec<TypeDef>,
    elements: Vec<ElementDecl>,
    attributes: Vec<AttributeDecl>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn simple_type(mut self, def: SimpleTypeDef) -> Self {
        self.types.push(TypeDef::Simple(def));
        self
    }

    #[must_use]
    pub fn complex_type(mut self, def: ComplexTypeDef) -> Self {
        self.types.push(TypeDef::Complex(def));
        self
    }

    #[must_use]
    pub fn element(mut self, decl: ElementDecl) -> Self {
        self.elements.push(decl);
        self
    }

    #[must_use]
    pub fn attribute(mut self, decl: AttributeDecl) -> Self {
        self.attributes.push(decl);
        self
    }

    pub fn build(self) -> Result<SchemaSet, SchemaError> {
        let mut set = SchemaSet::builtins_only();
        for def in self.types {
            let name = def.name().clone();
            if set.types.insert(name.clone(), def).is_some() {
                return Err(SchemaError::DuplicateType(name));
            }
        }
        for decl in self.elements {
            let name = decl.name.clone();
            if set.elements.insert(name.clone(), decl).is_some() {
                return Err(SchemaError::DuplicateElement(name));
            }
        }
        for decl in self.attributes {
            let name = decl.name.clone();
            if set.attributes.insert(name.clone(), decl).is_some() {
                return Err(SchemaError::DuplicateAttribute(name));
            }
        }
        check_references(&set)?;
        Ok(set)
    }
}

fn check_references(set: &SchemaSet) -> Result<(), SchemaError> {
    let require = |owner: &ExpandedName, type_name: &ExpandedName| {
        if set.types.contains_key(type_name) {
            Ok(())
        } else {
            Err(SchemaError::UnknownType {
                owner: owner.clone(),
                type_name: type_name.clone(),
            })
        }
    };
    let require_simple = |owner: &ExpandedName, type_name: &ExpandedName| {
        require(owner, type_name)?;
        match set.types.get(type_name) {
            Some(TypeDef::Simple(_)) => Ok(()),
            _ => Err(SchemaError::NotSimple {
                owner: owner.clone(),
                type_name: type_name.clone(),
            }),
        }
    };

    for def in set.types.values() {
        let name = def.name();
        if let Some(base) = def.base() {
            require(name, base)?;
        }
        match def {
            TypeDef::Simple(t) => {
                if let Some(base) = &t.base
                    && *base != builtins::any_type()
                {
                    require_simple(name, base)?;
                }
            }
            TypeDef::Complex(t) => {
                for attr in &t.attributes {
                    require_simple(&attr.name, &attr.type_name)?;
                }
                match &t.content {
                    ContentType::Simple(simple) => require_simple(name, simple)?,
                    ContentType::ElementOnly(model) | ContentType::Mixed(model) => {
                        for particle in model.particles() {
                            if let Particle::Element(decl) = particle {
                                require(&decl.name, &decl.type_name)?;
                            }
                        }
                    }
                    ContentType::Empty | ContentType::Any => {}
                }
            }
        }
        // a chain longer than the type count revisits a type
        if set.base_chain(name).count() > set.types.len() {
            return Err(SchemaError::CircularDerivation(name.clone()));
        }
    }
    for decl in set.elements.values() {
        require(&decl.name, &decl.type_name)?;
    }
    for decl in set.attributes.values() {
        require_simple(&decl.name, &decl.type_name)?;
    }
    Ok(())
}
