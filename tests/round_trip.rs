use gavel::{
    all, and, any, eq, evaluate, gt, is_in, neq, none, not, not_in, or, self_ref, DocumentError,
    Expr, GavelError, SELF_TOKEN,
};
use serde_json::json;

#[test]
fn document_shape_matches_wire_contract() {
    let rule = and([eq("user.status", "active"), gt("user.age", 18_i64)]);
    assert_eq!(
        rule.to_document(),
        json!({
            "operator": "and",
            "args": [
                {"operator": "eq", "args": ["user.status", "active"]},
                {"operator": "gt", "args": ["user.age", 18]},
            ]
        })
    );
}

#[test]
fn registry_names_round_trip() {
    let samples = vec![
        and([eq("a", 1_i64)]),
        or([eq("a", 1_i64), neq("b", 2_i64)]),
        not(eq("a", 1_i64)),
        gt("a", 1_i64),
        is_in("a", json!([1, 2])),
        not_in("a", json!([3])),
        any("xs", eq("k", 1_i64)),
        all("xs", eq("k", 1_i64)),
        none("xs", eq("k", 1_i64)),
    ];
    for rule in samples {
        let doc = rule.to_document();
        let name = doc["operator"].as_str().unwrap().to_owned();
        let restored = Expr::from_document(&doc)
            .unwrap_or_else(|err| panic!("operator '{name}' failed to decode: {err}"));
        assert_eq!(restored, rule, "mismatch for operator '{name}'");
    }
}

#[test]
fn wire_operator_names() {
    let pairs = [
        (and([eq("a", 1_i64)]).to_document(), "and"),
        (or([eq("a", 1_i64)]).to_document(), "or"),
        (not(true).to_document(), "not"),
        (eq("a", 1_i64).to_document(), "eq"),
        (neq("a", 1_i64).to_document(), "ne"),
        (gt("a", 1_i64).to_document(), "gt"),
        (is_in("a", json!([])).to_document(), "in"),
        (not_in("a", json!([])).to_document(), "notIn"),
        (any("xs", eq("a", 1_i64)).to_document(), "any"),
    ];
    for (doc, expected) in pairs {
        assert_eq!(doc["operator"], json!(expected));
    }
}

#[test]
fn sentinel_round_trips_through_text() {
    let rule = any("tags", eq(self_ref(), "rust"));
    let text = rule.to_json_string().unwrap();
    assert!(text.contains(SELF_TOKEN));

    let restored = Expr::from_json_str(&text).unwrap();
    assert_eq!(restored, rule);

    let ctx = json!({"tags": ["go", "rust"]});
    assert_eq!(
        evaluate(&restored, Some(&ctx)),
        evaluate(&rule, Some(&ctx))
    );
}

#[test]
fn handwritten_document_evaluates() {
    // A document authored out-of-band, the way rules arrive from storage.
    let doc = json!({
        "operator": "and",
        "args": [
            {"operator": "eq", "args": ["user.status", "active"]},
            {"operator": "any", "args": [
                "user.roles",
                {"operator": "in", "args": ["name", ["admin", "ops"]]},
            ]},
        ]
    });
    let rule = Expr::from_document(&doc).unwrap();

    let ctx = json!({"user": {"status": "active", "roles": [{"name": "ops"}]}});
    assert!(evaluate(&rule, Some(&ctx)));

    let ctx = json!({"user": {"status": "active", "roles": [{"name": "guest"}]}});
    assert!(!evaluate(&rule, Some(&ctx)));

    // Re-serialization reproduces the document exactly.
    assert_eq!(rule.to_document(), doc);
}

#[test]
fn bogus_operator_is_rejected() {
    let doc = json!({"operator": "bogus", "args": []});
    match Expr::from_document(&doc) {
        Err(DocumentError::UnknownOperator(name)) => assert_eq!(name, "bogus"),
        other => panic!("expected UnknownOperator, got {other:?}"),
    }
}

#[test]
fn nested_bogus_operator_is_rejected() {
    let doc = json!({
        "operator": "and",
        "args": [{"operator": "frobnicate", "args": []}]
    });
    assert!(matches!(
        Expr::from_document(&doc),
        Err(DocumentError::UnknownOperator(_))
    ));
}

#[test]
fn unified_error_wraps_document_failures() {
    let err = Expr::from_json_str(r#"{"operator": "bogus", "args": []}"#).unwrap_err();
    assert!(matches!(
        err,
        GavelError::Document(DocumentError::UnknownOperator(_))
    ));

    let err = Expr::from_json_str("{broken").unwrap_err();
    assert!(matches!(err, GavelError::Json(_)));
}

#[test]
fn membership_list_survives_round_trip_as_raw_array() {
    let rule = is_in("user.region", json!(["eu", "us-east", 7, null]));
    let doc = rule.to_document();
    assert_eq!(doc["args"][1], json!(["eu", "us-east", 7, null]));
    assert_eq!(Expr::from_document(&doc).unwrap(), rule);
}

#[test]
fn deeply_nested_document_round_trips() {
    let rule = and([
        or([eq("a", 1_i64), not(eq("b", 2_i64))]).into(),
        none("xs", any("ys", eq(self_ref(), "leaf"))).into(),
        gavel::Operand::from(true),
    ]);
    let restored = Expr::from_document(&rule.to_document()).unwrap();
    assert_eq!(restored, rule);
    assert_eq!(restored.to_document(), rule.to_document());
}
