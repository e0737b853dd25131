mod common;

use std::sync::Arc;

use common::{kinds, messages, run, validator, xs};
use proptest::prelude::*;
use xmlbind_engine::chars::Chars;
use xmlbind_engine::diagnostics::DiagnosticKind;
use xmlbind_engine::event::Event;
use xmlbind_engine::model::{ExpandedName, Location};
use xmlbind_engine::recorded::{ElementBuilder, TokenBuilder, doc, elem};
use xmlbind_engine::schema::{AttributeUse, ComplexTypeDef, ContentType, ElementDecl, SchemaSet};
use xmlbind_engine::validator::Validator;
use xmlbind_engine::whitespace::WhitespaceMode;

#[test]
fn first_event_must_be_a_nameless_begin() {
    let mut v = validator();
    let text = "x";
    v.process(&Event::text(Chars::whole(text)).at(Location::new(3, 7)));
    assert!(v.is_aborted());
    assert_eq!(kinds(&v), [DiagnosticKind::Structural]);
    assert_eq!(v.diagnostics()[0].location, Location::new(3, 7));

    // everything after a fatal error is ignored
    v.process(&Event::begin(None));
    v.finish();
    assert_eq!(v.diagnostics().len(), 1);
}

#[test]
fn named_first_begin_is_fatal() {
    let name = ExpandedName::local("amount");
    let mut v = validator();
    v.process(&Event::begin(Some(&name)));
    assert!(v.is_aborted());
    assert!(messages(&v)[0].contains("nameless BEGIN"));
}

#[test]
fn event_after_document_end_is_fatal() {
    let document = TokenBuilder::new()
        .start_document()
        .begin("amount")
        .end_attrs()
        .text("1")
        .end()
        .end()
        .end()
        .build();
    let v = run(&document);
    assert!(v.is_aborted());
    assert_eq!(messages(&v), ["event after the end of the document"]);
    assert_eq!(v.values().len(), 1);
}

#[test]
fn finish_with_open_frames_names_the_depth() {
    let document = TokenBuilder::new()
        .start_document()
        .begin("purchaseOrder")
        .end_attrs()
        .begin("shipTo")
        .end_attrs()
        .build();
    let v = run(&document);
    assert!(v.is_aborted());
    assert_eq!(kinds(&v), [DiagnosticKind::Structural]);
    assert!(messages(&v)[0].contains("2 open element(s)"), "{:?}", messages(&v));
}

#[test]
fn finish_without_any_event_is_not_an_error() {
    let mut v = validator();
    v.finish();
    assert!(v.diagnostics().is_empty());
    assert!(!v.is_aborted());
}

#[test]
fn missing_end_attrs_is_recovered() {
    let document = TokenBuilder::new()
        .start_document()
        .begin("price")
        .attr("currency", "EUR")
        .text("3.5")
        .end()
        .end()
        .build();
    let v = run(&document);
    assert!(!v.is_aborted());
    assert_eq!(kinds(&v), [DiagnosticKind::Structural]);
    assert!(messages(&v)[0].starts_with("missing ENDATTRS for element 'price'"));
    assert_eq!(v.values().len(), 2);
}

#[test]
fn stray_end_attrs_and_late_attributes_are_ignored() {
    let document = TokenBuilder::new()
        .start_document()
        .begin("flag")
        .end_attrs()
        .end_attrs()
        .attr("on", "true")
        .end()
        .end()
        .build();
    let v = run(&document);
    assert!(v.is_finished());
    assert_eq!(kinds(&v), [DiagnosticKind::Structural, DiagnosticKind::Structural]);
    assert!(messages(&v)[1].contains("arrived after the attributes"));
    assert!(v.values().is_empty());
}

#[test]
fn attribute_on_the_document_is_structural() {
    let document = TokenBuilder::new()
        .start_document()
        .attr("stray", "1")
        .end_attrs()
        .begin("amount")
        .end_attrs()
        .text("1")
        .end()
        .end()
        .build();
    let v = run(&document);
    assert_eq!(messages(&v), ["attribute 'stray' outside of any element"]);
    assert!(v.is_finished());
}

#[test]
fn text_is_copied_before_the_buffer_goes_away() {
    let mut v = validator();
    let amount = ExpandedName::local("amount");
    v.process(&Event::begin(None));
    v.process(&Event::begin(Some(&amount)));
    v.process(&Event::end_attrs());
    {
        let chunk = String::from(" 4");
        v.process(&Event::text(Chars::new(&chunk, 0, 2).unwrap()));
    }
    {
        let chunk = String::from("2 ");
        v.process(&Event::text(Chars::whole(&chunk)));
    }
    v.process(&Event::end());
    v.process(&Event::end());
    v.finish();
    assert!(v.is_valid());
    assert_eq!(v.values()[0].value.to_string(), "42");
}

#[test]
fn pending_whitespace_from_the_token_source_is_applied() {
    let schema = SchemaSet::builder()
        .complex_type(
            ComplexTypeDef::new("labelType", ContentType::Simple(xs("string")))
                .with_attribute(AttributeUse::optional("title", xs("string"))),
        )
        .element(ElementDecl::new("label", ExpandedName::local("labelType")))
        .build()
        .unwrap();
    let mut v = Validator::new(Arc::new(schema));
    let label = ExpandedName::local("label");
    let title = ExpandedName::local("title");
    v.process(&Event::begin(None));
    v.process(&Event::begin(Some(&label)));
    v.process(&Event::attr(&title, Chars::whole("a\tb").with_pending(WhitespaceMode::Replace)));
    v.process(&Event::end_attrs());
    v.process(&Event::text(Chars::whole("  x \n y ").with_pending(WhitespaceMode::Collapse)));
    v.process(&Event::end());
    v.process(&Event::end());
    v.finish();
    assert!(v.is_valid(), "{:?}", v.diagnostics());
    let values: Vec<String> = v.values().iter().map(|b| b.value.to_string()).collect();
    // xs:string alone would preserve both
    assert_eq!(values, ["a b", "x y"]);
}

// Arbitrary element trees over names the schema partly knows.
fn tree() -> impl Strategy<Value = ElementBuilder> {
    let name = prop::sample::select(vec!["item", "items", "note", "b", "zzz", "amount"]);
    let leaf = (name.clone(), "[a-z ]{0,4}").prop_map(|(n, t)| elem(n).text(&t));
    leaf.prop_recursive(4, 24, 4, move |inner| {
        (name.clone(), prop::collection::vec(inner, 0..4))
            .prop_map(|(n, kids)| kids.into_iter().fold(elem(n), ElementBuilder::child))
    })
}

proptest! {
    #[test]
    fn prop_balanced_streams_never_produce_structural_errors(root in tree()) {
        let v = run(&doc().child(root).build());
        prop_assert!(v.is_finished());
        prop_assert_eq!(v.depth(), 0);
        prop_assert!(
            v.diagnostics().iter().all(|d| d.kind != DiagnosticKind::Structural),
            "{:?}",
            v.diagnostics()
        );
    }
}
