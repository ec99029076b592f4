//! Open-list ordering and key derivation under long insertion sequences.

use dstar_search::node::{Graph, NodeId, NodeState};
use dstar_search::open_list::OpenList;

/// Deterministic 64-bit LCG (Knuth MMIX constants).
struct Lcg(u64);

impl Lcg {
    fn step(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.step() % n
    }
}

const NODES: u32 = 48;

/// Small integer grid of values so equal keys show up often.
fn heuristic_of(id: NodeId) -> f64 {
    f64::from(id.raw() % 5)
}

fn run_sequence(seed: u64, steps: usize) {
    let mut graph = Graph::from_payloads((0..NODES).map(|_| ())).unwrap();
    let mut open = OpenList::new();
    let mut rng = Lcg(seed);

    for _ in 0..steps {
        if rng.below(4) == 0 {
            if let Some(id) = open.pop_min(&mut graph) {
                assert_eq!(graph[id].state(), NodeState::Closed);
            }
        } else {
            let id = NodeId::new(u32::try_from(rng.below(u64::from(NODES))).unwrap());
            let new_g = f64::from(u32::try_from(rng.below(20)).unwrap());
            let before = (graph[id].state(), graph[id].k(), graph[id].g());
            open.insert(&mut graph, id, new_g, |n| heuristic_of(n.id())).unwrap();

            let node = &graph[id];
            match before {
                (NodeState::New, _, _) => {
                    assert_eq!(node.k().to_bits(), new_g.to_bits());
                }
                (NodeState::Open, old_k, _) => assert!(node.k() <= old_k),
                (NodeState::Closed, _, old_g) => {
                    assert_eq!(node.k().to_bits(), old_g.min(new_g).to_bits());
                }
            }
            assert_eq!(node.g().to_bits(), new_g.to_bits());
            assert_eq!(node.f().to_bits(), (node.k() + node.h()).to_bits());
        }
        assert!(open.check_invariants(&graph), "seed {seed}: list out of order");
    }

    let mut last = None;
    while let Some(id) = open.pop_min(&mut graph) {
        let key = graph[id].open_key();
        if let Some(prev) = last {
            assert!(!key.less_than(prev), "seed {seed}: pops went backwards");
        }
        last = Some(key);
    }
    assert!(open.is_empty());
}

#[test]
fn random_sequences_keep_the_list_sorted() {
    for seed in [1, 7, 42, 1_000_003, 0xDEAD_BEEF] {
        run_sequence(seed, 600);
    }
}

#[test]
fn equal_keys_pop_in_arrival_order() {
    let mut graph = Graph::from_payloads((0..6).map(|_| ())).unwrap();
    let mut open = OpenList::new();
    for raw in [3, 1, 4, 0, 5, 2] {
        open.insert(&mut graph, NodeId::new(raw), 2.0, |_| 1.0).unwrap();
    }
    let order: Vec<u32> = std::iter::from_fn(|| open.pop_min(&mut graph))
        .map(NodeId::raw)
        .collect();
    assert_eq!(order, vec![3, 1, 4, 0, 5, 2]);
}
