use gavel::{any, eq, evaluate, gte, self_ref, Expr};
use serde_json::json;

fn main() {
    // Build a rule, ship it as JSON, and bring it back.
    let rule = eq("plan", "pro")
        .and(gte("seats", 5_i64))
        .and(any("features", eq(self_ref(), "sso")));

    let text = rule.to_json_string().expect("rule serializes");
    println!("wire form:\n{text}\n");

    let restored = Expr::from_json_str(&text).expect("wire form decodes");
    assert_eq!(restored, rule);

    let ctx = json!({
        "plan": "pro",
        "seats": 12,
        "features": ["audit-log", "sso"],
    });
    println!("restored rule matches: {}", evaluate(&restored, Some(&ctx)));

    // Unknown operators are rejected, not guessed at.
    let bogus = json!({"operator": "bogus", "args": []});
    match Expr::from_document(&bogus) {
        Ok(_) => unreachable!(),
        Err(err) => println!("bogus document: {err}"),
    }
}
