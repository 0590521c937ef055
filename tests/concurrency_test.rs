//! Kept in its own test binary: the single-threaded baseline clears the process-wide cache.

use pretty_assertions::assert_eq;
use route_docs::shape::{clear_cache, reflect, DocumentationObject};
use serde::Deserialize;
use std::sync::Barrier;
use std::thread;

const THREADS: usize = 8;

#[derive(Deserialize)]
#[allow(dead_code)]
struct Order {
    id: u64,
    lines: Vec<Line>,
    customer: Customer,
    note: Option<String>,
}

#[derive(Deserialize)]
#[allow(dead_code)]
struct Line {
    sku: String,
    quantity: u32,
}

#[derive(Deserialize)]
#[allow(dead_code)]
struct Customer {
    name: String,
    tier: Tier,
}

#[derive(Deserialize)]
#[allow(dead_code)]
enum Tier {
    Free,
    Paid { seats: u16 },
}

#[derive(Deserialize)]
#[allow(dead_code)]
#[serde(tag = "method")]
enum Payment {
    Card { last4: String },
    Invoice { days: u8 },
}

/// Every type of the run, starting at a different one per thread so that
/// threads race on both shared and distinct roots
fn reflect_all(start: usize) -> Vec<DocumentationObject> {
    let reflectors: [fn() -> DocumentationObject; 5] = [
        || reflect::<Order>().unwrap(),
        || reflect::<Line>().unwrap(),
        || reflect::<Customer>().unwrap(),
        || reflect::<Payment>().unwrap(),
        || reflect::<Vec<Payment>>().unwrap(),
    ];

    let mut results = vec![None; reflectors.len()];
    for offset in 0..reflectors.len() {
        let index = (start + offset) % reflectors.len();
        results[index] = Some(reflectors[index]());
    }
    results.into_iter().map(Option::unwrap).collect()
}

#[test]
fn test_concurrent_reflection_matches_single_threaded() {
    let barrier = Barrier::new(THREADS);
    let concurrent: Vec<Vec<DocumentationObject>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|start| {
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    reflect_all(start)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    clear_cache();
    let baseline = reflect_all(0);

    for results in &concurrent {
        assert_eq!(results, &baseline);
    }
}
