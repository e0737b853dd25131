mod common;

use std::sync::Arc;

use common::{EXT, kinds, messages, run, xs};
use rstest::rstest;
use xmlbind_engine::diagnostics::DiagnosticKind;
use xmlbind_engine::model::ExpandedName;
use xmlbind_engine::recorded::{ElementBuilder, doc, elem};
use xmlbind_engine::schema::content::{ContentModelBuilder, Particle};
use xmlbind_engine::schema::{ComplexTypeDef, ContentType, ElementDecl, SchemaSet};
use xmlbind_engine::validator::Validator;
use xmlbind_engine::value::XmlValue;

fn item(part: &str, name: &str, quantity: &str) -> ElementBuilder {
    elem("item")
        .attr("partNum", part)
        .child(elem("productName").text(name))
        .child(elem("quantity").text(quantity))
}

fn order(items: ElementBuilder) -> ElementBuilder {
    elem("purchaseOrder")
        .child(elem("shipTo").text("Alice"))
        .child(items)
}

#[test]
fn valid_order_is_clean() {
    let document = doc()
        .child(
            elem("purchaseOrder")
                .attr("orderDate", "2024-05-01")
                .text("\n  ")
                .child(elem("shipTo").text("Alice"))
                .child(elem("items").child(item("p1", "Lawnmower", " 1 ")))
                .child(elem(ExpandedName::ns(EXT, "extra")).text("5")),
        )
        .build();
    let v = run(&document);
    assert!(v.is_valid(), "{:?}", v.diagnostics());
    assert!(v.is_finished());
    assert_eq!(v.depth(), 0);

    let names: Vec<String> = v.values().iter().map(|b| b.name.local.clone()).collect();
    assert_eq!(names, ["orderDate", "shipTo", "partNum", "productName", "quantity", "extra"]);
    assert_eq!(v.values()[4].value.to_string(), "1");
    assert_eq!(v.values()[5].value, XmlValue::Int(5));
}

#[test]
fn unexpected_child_names_what_was_expected() {
    let document = doc()
        .child(elem("purchaseOrder").child(elem("items")))
        .build();
    let v = run(&document);
    assert_eq!(kinds(&v), [DiagnosticKind::ContentModel, DiagnosticKind::ContentModel]);
    let msgs = messages(&v);
    assert!(msgs[0].contains("unexpected element 'items'"), "{msgs:?}");
    assert!(msgs[0].contains("expected 'shipTo'"), "{msgs:?}");
    assert!(msgs[1].contains("missing required content"), "{msgs:?}");
}

#[test]
fn missing_required_child_is_reported_at_end() {
    let document = doc()
        .child(order(elem("items").child(
            elem("item").attr("partNum", "p1").child(elem("productName").text("x")),
        )))
        .build();
    let v = run(&document);
    assert_eq!(kinds(&v), [DiagnosticKind::ContentModel]);
    assert!(messages(&v)[0].contains("expected 'quantity'"));
}

#[test]
fn skipped_subtree_produces_exactly_one_diagnostic() {
    let document = doc()
        .child(order(
            elem("items").child(
                elem("bogus")
                    .attr("x", "1")
                    .text("junk")
                    .child(elem("deeper").attr("y", "2").text("more"))
                    .child(elem("item")),
            ),
        ))
        .build();
    let v = run(&document);
    assert_eq!(kinds(&v), [DiagnosticKind::ContentModel]);
    assert!(!v.is_aborted());
    assert_eq!(v.depth(), 0);
}

#[test]
fn text_in_element_only_content_reports_once() {
    let document = doc()
        .child(order(elem("items").text("oops").text(" \n").text("again")))
        .build();
    let v = run(&document);
    assert_eq!(kinds(&v), [DiagnosticKind::ContentModel]);
    assert!(messages(&v)[0].contains("element 'items' does not allow character data"));
}

#[test]
fn mixed_content_accepts_text() {
    let document = doc()
        .child(
            elem("note")
                .text("hello ")
                .child(elem("b").text("bold"))
                .text(" world"),
        )
        .build();
    let v = run(&document);
    assert!(v.is_valid(), "{:?}", v.diagnostics());
    assert_eq!(v.values().len(), 1);
}

#[rstest]
#[case(elem("flag").child(elem("x")), "has empty content, found child 'x'")]
#[case(elem("flag").text("x"), "does not allow character data")]
#[case(elem("price").text("1").child(elem("x")), "has simple content, found child 'x'")]
fn content_type_rejections(#[case] root: ElementBuilder, #[case] fragment: &str) {
    let v = run(&doc().child(root).build());
    assert_eq!(kinds(&v), [DiagnosticKind::ContentModel]);
    assert!(messages(&v)[0].contains(fragment), "{:?}", messages(&v));
}

#[test]
fn simple_content_is_converted_at_end() {
    let v = run(&doc().child(elem("price").attr("currency", "EUR").text(" 12.50 ")).build());
    assert!(v.is_valid(), "{:?}", v.diagnostics());
    let price = v.values().last().unwrap();
    assert_eq!(price.name, ExpandedName::local("price"));
    assert_eq!(price.type_name, xs("decimal"));
    assert_eq!(price.value.to_string(), "12.5");
}

#[test]
fn any_type_skips_unknown_children_and_validates_known_ones() {
    let document = doc()
        .child(
            elem("anything")
                .text("free text")
                .child(elem("whatever").child(elem("amount").text("not checked")))
                .child(elem("amount").text("x")),
        )
        .build();
    let v = run(&document);
    assert_eq!(kinds(&v), [DiagnosticKind::Conversion]);
    assert_eq!(v.values()[0].value, XmlValue::Invalid("x".into()));
}

#[test]
fn lax_wildcard_skips_undeclared_elements() {
    let document = doc()
        .child(order(elem("items")).child(
            elem(ExpandedName::ns("urn:other", "foo"))
                .text("anything goes")
                .child(elem("bar")),
        ))
        .build();
    let v = run(&document);
    assert!(v.is_valid(), "{:?}", v.diagnostics());
}

#[test]
fn wildcard_namespace_constraint_applies() {
    let v = run(&doc().child(order(elem("items")).child(elem("bogus"))).build());
    assert_eq!(kinds(&v), [DiagnosticKind::ContentModel]);
    assert!(messages(&v)[0].ends_with("expected any element from another namespace"));
}

#[test]
fn unknown_root_is_reported_at_its_begin() {
    let v = run(&doc().child(elem("nope").child(elem("x").text("t"))).build());
    assert_eq!(kinds(&v), [DiagnosticKind::ContentModel]);
    assert!(messages(&v)[0].contains("no global declaration for root element 'nope'"));
    assert_eq!(v.diagnostics()[0].location.line, 2);
}

#[test]
fn second_root_is_rejected() {
    let document = doc()
        .child(elem("amount").text("1"))
        .child(elem("amount").text("2"))
        .build();
    let v = run(&document);
    assert_eq!(messages(&v), ["second root element 'amount'"]);
    assert_eq!(v.values().len(), 1);
}

#[rstest]
#[case("junk", 1)]
#[case("\n  \t", 0)]
fn document_level_text(#[case] text: &str, #[case] errors: usize) {
    let v = run(&doc().text(text).child(elem("amount").text("1")).text("\n").build());
    assert_eq!(v.sink().error_count(), errors);
}

#[test]
fn document_without_root() {
    let v = run(&doc().build());
    assert_eq!(messages(&v), ["document has no root element"]);
    assert!(v.is_finished());
}

// (a | b) c
fn choice_validator() -> Validator {
    let el = |n: &str| Particle::Element(ElementDecl::new(n, xs("string")));
    let mut b = ContentModelBuilder::new();
    let start = b.add_state(false);
    let picked = b.add_state(false);
    let done = b.add_state(true);
    b.add_transition(start, el("a"), picked)
        .add_transition(start, el("b"), picked)
        .add_transition(picked, el("c"), done);
    let schema = SchemaSet::builder()
        .complex_type(ComplexTypeDef::new(
            "choiceType",
            ContentType::ElementOnly(Arc::new(b.build().unwrap())),
        ))
        .element(ElementDecl::new("choice", ExpandedName::local("choiceType")))
        .build()
        .unwrap();
    Validator::new(Arc::new(schema))
}

#[rstest]
#[case(&["a", "c"], true)]
#[case(&["b", "c"], true)]
#[case(&["c"], false)]
#[case(&["a", "b", "c"], false)]
#[case(&["a"], false)]
#[case(&[], false)]
fn hand_built_automaton(#[case] children: &[&str], #[case] valid: bool) {
    let root = children
        .iter()
        .fold(elem("choice"), |e, name| e.child(elem(*name).text("v")));
    let mut v = choice_validator();
    doc().child(root).build().replay(&mut v);
    assert_eq!(v.is_valid(), valid, "{children:?}: {:?}", v.diagnostics());
}
