//! Integration tests for round-robin selection order.

use std::collections::HashSet;
use std::sync::Arc;

use rotary::balancer::{LoadBalancer, RoundRobin};

fn balancer(n: usize) -> LoadBalancer {
    let addresses: Vec<String> = (0..n).map(|i| format!("http://10.0.0.{i}:8080")).collect();
    LoadBalancer::new(&addresses, false).unwrap()
}

#[test]
fn sequential_calls_follow_registry_order() {
    let lb = balancer(4);
    let picks: Vec<String> = (0..10)
        .map(|_| lb.next_backend().base().to_string())
        .collect();

    let expected: Vec<String> = (0..10)
        .map(|i| format!("http://10.0.0.{}:8080", i % 4))
        .collect();
    assert_eq!(picks, expected);
}

#[test]
fn single_backend_is_always_selected() {
    let lb = balancer(1);
    for _ in 0..50 {
        assert_eq!(lb.next_backend().base(), "http://10.0.0.0:8080");
    }
}

#[test]
fn each_cycle_visits_every_backend_once() {
    let lb = balancer(5);
    for _ in 0..3 {
        let cycle: HashSet<usize> = (0..5).map(|_| lb.next_backend().id().index()).collect();
        assert_eq!(cycle.len(), 5);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_tasks_never_share_a_position() {
    const TASKS: usize = 64;
    const PER_TASK: usize = 500;

    let rr = Arc::new(RoundRobin::new());
    let mut handles = Vec::new();
    for _ in 0..TASKS {
        let rr = Arc::clone(&rr);
        handles.push(tokio::spawn(async move {
            (0..PER_TASK).map(|_| rr.next_position()).collect::<Vec<_>>()
        }));
    }

    let mut positions = Vec::with_capacity(TASKS * PER_TASK);
    for handle in handles {
        positions.extend(handle.await.unwrap());
    }
    positions.sort_unstable();

    let expected: Vec<u64> = (0..(TASKS * PER_TASK) as u64).collect();
    assert_eq!(positions, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_selection_is_balanced() {
    const CYCLES: usize = 200;

    let lb = Arc::new(balancer(3));
    let mut handles = Vec::new();
    for _ in 0..CYCLES * 3 {
        let lb = Arc::clone(&lb);
        handles.push(tokio::spawn(async move { lb.next_backend().id().index() }));
    }

    let mut counts = [0usize; 3];
    for handle in handles {
        counts[handle.await.unwrap()] += 1;
    }
    assert_eq!(counts, [CYCLES; 3]);
}
