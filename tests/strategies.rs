use gavel::{eq, gt, gte, is_in, lt, lte, neq, not, self_ref, Expr};
use proptest::prelude::*;
use serde_json::{json, Value};

// --- Fixed context schema ---
// user.age    : i64 (0..=120)
// user.status : string, one of {"active", "inactive", "suspended"}
// user.banned : bool
// user.region : string, one of {"us-east", "us-west", "eu", "ap"}
// user.roles  : array of {name}, names drawn from {"admin", "ops", "user"}
// user.tags   : array of strings from {"alpha", "beta", "gamma"}

const STATUSES: &[&str] = &["active", "inactive", "suspended"];
const REGIONS: &[&str] = &["us-east", "us-west", "eu", "ap"];
const ROLES: &[&str] = &["admin", "ops", "user"];
const TAGS: &[&str] = &["alpha", "beta", "gamma"];

/// Generate a context that aligns with the fixed schema.
pub fn arb_context() -> impl Strategy<Value = Value> {
    (
        0_i64..=120,
        prop::sample::select(STATUSES),
        any::<bool>(),
        prop::sample::select(REGIONS),
        prop::collection::vec(prop::sample::select(ROLES), 0..4),
        prop::collection::vec(prop::sample::select(TAGS), 0..4),
    )
        .prop_map(|(age, status, banned, region, roles, tags)| {
            let roles: Vec<Value> = roles.iter().map(|name| json!({ "name": name })).collect();
            json!({
                "user": {
                    "age": age,
                    "status": status,
                    "banned": banned,
                    "region": region,
                    "roles": roles,
                    "tags": tags,
                }
            })
        })
}

/// Generate an arbitrary JSON value of bounded depth, for chaos contexts that
/// need not match the schema at all.
pub fn arb_chaos_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        (-1.0e12_f64..1.0e12).prop_map(Value::from),
        "[a-z0-9.]{0,12}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

/// Generate a leaf expression against the fixed schema.
fn arb_leaf_expr() -> impl Strategy<Value = Expr> {
    prop_oneof![
        // user.age comparisons
        (0_i64..=120, 0_u8..6).prop_map(|(val, op)| match op {
            0 => eq("user.age", val),
            1 => neq("user.age", val),
            2 => gt("user.age", val),
            3 => gte("user.age", val),
            4 => lt("user.age", val),
            _ => lte("user.age", val),
        }),
        // user.status / user.region equality
        (prop::sample::select(STATUSES), prop::bool::ANY).prop_map(|(val, is_eq)| {
            if is_eq {
                eq("user.status", val)
            } else {
                neq("user.status", val)
            }
        }),
        (prop::sample::select(REGIONS), prop::bool::ANY).prop_map(|(val, is_eq)| {
            if is_eq {
                eq("user.region", val)
            } else {
                neq("user.region", val)
            }
        }),
        // user.banned
        any::<bool>().prop_map(|val| eq("user.banned", val)),
        // membership on region
        prop::sample::subsequence(REGIONS.to_vec(), 0..REGIONS.len())
            .prop_map(|list| is_in("user.region", json!(list))),
        // quantifiers over the roles array
        (prop::sample::select(ROLES), 0_u8..3).prop_map(|(name, op)| match op {
            0 => gavel::any("user.roles", eq("name", name)),
            1 => gavel::all("user.roles", eq("name", name)),
            _ => gavel::none("user.roles", eq("name", name)),
        }),
        // quantifiers over the primitive tags array, via the self sentinel
        (prop::sample::select(TAGS), prop::bool::ANY).prop_map(|(tag, is_any)| {
            if is_any {
                gavel::any("user.tags", eq(self_ref(), tag))
            } else {
                gavel::none("user.tags", eq(self_ref(), tag))
            }
        }),
    ]
}

/// Generate a composite expression tree (AND, OR, NOT of leaves), bounded depth.
pub fn arb_expr(max_depth: u32) -> impl Strategy<Value = Expr> {
    arb_leaf_expr().prop_recursive(max_depth, 16, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(gavel::and),
            prop::collection::vec(inner.clone(), 1..4).prop_map(gavel::or),
            inner.prop_map(not),
        ]
    })
}
