use std::sync::Arc;
use std::thread;

use gavel::{and, eq, gt};
use serde_json::json;

fn main() {
    // One compiled rule, shared read-only across worker threads.
    let rule = Arc::new(and([
        eq("request.region", "eu"),
        gt("request.score", 50_i64),
    ]));

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let rule = Arc::clone(&rule);
            thread::spawn(move || {
                let mut accepted = 0;
                for i in 0..1000 {
                    let ctx = json!({
                        "request": {
                            "region": if i % 2 == 0 { "eu" } else { "ap" },
                            "score": i % 100,
                        }
                    });
                    if rule.evaluate(&ctx) {
                        accepted += 1;
                    }
                }
                (worker, accepted)
            })
        })
        .collect();

    for handle in handles {
        let (worker, accepted) = handle.join().unwrap();
        println!("worker {worker}: accepted {accepted}/1000");
    }
}
