use gavel::{and, any, eq, evaluate, gt, not, Operand};
use serde_json::json;

fn main() {
    // An authorization rule: active adult with an admin role, not banned.
    let rule = and::<[Operand; 4]>([
        eq("user.status", "active").into(),
        gt("user.age", 18_i64).into(),
        not("user.banned").into(),
        any("user.roles", eq("name", "admin")).into(),
    ]);

    println!("rule: {rule}");

    let ctx = json!({
        "user": {
            "status": "active",
            "age": 34,
            "banned": false,
            "roles": [{"name": "user"}, {"name": "admin"}],
        }
    });

    println!("admin user  -> {}", evaluate(&rule, Some(&ctx)));

    let ctx = json!({
        "user": {
            "status": "active",
            "age": 34,
            "banned": false,
            "roles": [{"name": "user"}],
        }
    });

    println!("plain user  -> {}", evaluate(&rule, Some(&ctx)));
    println!("no context  -> {}", evaluate(&rule, None));
}
