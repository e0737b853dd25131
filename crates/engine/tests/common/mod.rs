#![allow(dead_code)]

use std::sync::Arc;

use xmlbind_engine::diagnostics::DiagnosticKind;
use xmlbind_engine::model::ExpandedName;
use xmlbind_engine::recorded::RecordedDocument;
use xmlbind_engine::schema::content::{
    ContentModel, NamespaceConstraint, Occurs, Particle, ProcessContents, Wildcard,
};
use xmlbind_engine::schema::{
    AttributeDecl, AttributeUse, ComplexTypeDef, ContentType, ElementDecl, SchemaSet,
    SimpleTypeDef,
};
use xmlbind_engine::validator::Validator;

pub const EXT: &str = "urn:ext";

pub fn xs(local: &str) -> ExpandedName {
    ExpandedName::xs(local)
}

pub fn local(name: &str) -> ExpandedName {
    ExpandedName::local(name)
}

fn el(name: &str, ty: ExpandedName) -> Particle {
    Particle::Element(ElementDecl::new(name, ty))
}

/// Purchase-order style schema used across the validator tests.
///
/// ```text
/// purchaseOrder : orderType      (shipTo nillable string, items, ##other lax*)
///   @orderDate date, @{urn:ext}* lax
/// items         : itemsType      (item*)
/// item          : itemType       (productName, quantity, comment?)
///   @partNum NCName required, @currency token fixed EUR, @code, @{urn:ext}* strict
/// note          : noteType       mixed (b*)
/// price         : priceType      simple decimal, @currency
/// flag          : emptyType      empty, @on boolean
/// amount        : int, nillable
/// stamp         : stampType      simple dateTime, @at dateTime
/// anything      : anyType
/// {urn:ext}extra: int, {urn:ext}tag attribute: token
/// ```
pub fn order_schema() -> SchemaSet {
    let item = ContentModel::sequence([
        (el("productName", xs("string")), Occurs::Once),
        (el("quantity", local("quantityType")), Occurs::Once),
        (el("comment", xs("string")), Occurs::Optional),
    ]);
    let items = ContentModel::sequence([(el("item", local("itemType")), Occurs::ZeroOrMore)]);
    let order = ContentModel::sequence([
        (
            Particle::Element(ElementDecl::new("shipTo", xs("string")).nillable()),
            Occurs::Once,
        ),
        (el("items", local("itemsType")), Occurs::Once),
        (
            Particle::Wildcard(Wildcard {
                namespaces: NamespaceConstraint::Other(None),
                process: ProcessContents::Lax,
            }),
            Occurs::ZeroOrMore,
        ),
    ]);
    let note = ContentModel::sequence([(el("b", xs("string")), Occurs::ZeroOrMore)]);

    SchemaSet::builder()
        .simple_type(SimpleTypeDef::new("quantityType", xs("positiveInteger")))
        .simple_type(
            SimpleTypeDef::new("codeType", xs("anySimpleType"))
                .with_whitespace(xmlbind_engine::WhitespaceMode::Collapse),
        )
        .complex_type(
            ComplexTypeDef::new("itemType", ContentType::ElementOnly(Arc::new(item)))
                .with_attribute(AttributeUse::required("partNum", xs("NCName")))
                .with_attribute(AttributeUse::optional("currency", xs("token")).with_fixed("EUR"))
                .with_attribute(AttributeUse::optional("code", local("codeType")))
                .with_attribute_wildcard(Wildcard {
                    namespaces: NamespaceConstraint::Only(vec![Some(EXT.to_owned())]),
                    process: ProcessContents::Strict,
                }),
        )
        .complex_type(ComplexTypeDef::new(
            "itemsType",
            ContentType::ElementOnly(Arc::new(items)),
        ))
        .complex_type(
            ComplexTypeDef::new("orderType", ContentType::ElementOnly(Arc::new(order.clone())))
                .with_attribute(AttributeUse::optional("orderDate", xs("date")))
                .with_attribute_wildcard(Wildcard {
                    namespaces: NamespaceConstraint::Only(vec![Some(EXT.to_owned())]),
                    process: ProcessContents::Lax,
                }),
        )
        .complex_type(
            ComplexTypeDef::new("rushOrderType", ContentType::ElementOnly(Arc::new(order)))
                .with_base(local("orderType"))
                .with_attribute(AttributeUse::required("deadline", xs("dateTime"))),
        )
        .complex_type(ComplexTypeDef::new("noteType", ContentType::Mixed(Arc::new(note))))
        .complex_type(
            ComplexTypeDef::new("priceType", ContentType::Simple(xs("decimal")))
                .with_attribute(AttributeUse::optional("currency", xs("token"))),
        )
        .complex_type(
            ComplexTypeDef::new("emptyType", ContentType::Empty)
                .with_attribute(AttributeUse::optional("on", xs("boolean"))),
        )
        .complex_type(
            ComplexTypeDef::new("stampType", ContentType::Simple(xs("dateTime")))
                .with_attribute(AttributeUse::optional("at", xs("dateTime"))),
        )
        .element(ElementDecl::new("purchaseOrder", local("orderType")))
        .element(ElementDecl::new("note", local("noteType")))
        .element(ElementDecl::new("price", local("priceType")))
        .element(ElementDecl::new("flag", local("emptyType")))
        .element(ElementDecl::new("amount", xs("int")).nillable())
        .element(ElementDecl::new("anything", xs("anyType")))
        .element(ElementDecl::new("stamp", local("stampType")))
        .element(ElementDecl::new(ExpandedName::ns(EXT, "extra"), xs("int")))
        .attribute(AttributeDecl::new(ExpandedName::ns(EXT, "tag"), xs("token")))
        .build()
        .expect("order schema is consistent")
}

pub fn validator() -> Validator {
    Validator::new(Arc::new(order_schema()))
}

pub fn run(document: &RecordedDocument) -> Validator {
    let mut v = validator();
    document.replay(&mut v);
    v
}

pub fn kinds(v: &Validator) -> Vec<DiagnosticKind> {
    v.diagnostics().iter().map(|d| d.kind).collect()
}

pub fn messages(v: &Validator) -> Vec<String> {
    v.diagnostics().iter().map(|d| d.message.clone()).collect()
}
