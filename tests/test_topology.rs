// Tests for graph construction: layer sizes, dense wiring, id stability and
// initial parameter ranges.

use std::collections::HashSet;

use nodenet::{ActivationScheme, Network, NnError, Topology};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn build(topology: Topology, seed: u64) -> Network {
    Network::build(topology, ActivationScheme::Logistic, &mut StdRng::seed_from_u64(seed)).unwrap()
}

#[test]
fn mnist_sized_topology_has_expected_counts() {
    let topology = Topology::new(784, 2, 128, 10);
    let network = build(topology, 1);

    assert_eq!(network.nodes().len(), 1050);
    assert_eq!(network.connections().len(), 784 * 128 + 128 * 128 + 128 * 10);
    assert_eq!(network.connections().len(), 118_016);
    assert_eq!(topology.node_count(), 1050);
    assert_eq!(topology.connection_count(), 118_016);
}

#[test]
fn layers_have_the_requested_widths() {
    let network = build(Topology::new(5, 3, 4, 2), 2);
    assert_eq!(network.last_layer(), 4);
    assert_eq!(network.layer(0).len(), 5);
    for layer in 1..=3 {
        assert_eq!(network.layer(layer).len(), 4);
    }
    assert_eq!(network.layer(4).len(), 2);
    assert!(network.layer(5).is_empty());
    assert!(network.layer(0).iter().all(|n| n.is_input()));
    assert!(network.layer(4).iter().all(|n| n.layer() == 4));
}

#[test]
fn every_connection_joins_adjacent_layers() {
    let network = build(Topology::new(3, 2, 4, 2), 3);
    for connection in network.connections() {
        let source = network.node(connection.source()).unwrap();
        let destination = network.node(connection.destination()).unwrap();
        assert_ne!(connection.source(), connection.destination());
        assert_eq!(source.layer() + 1, destination.layer());
    }
}

#[test]
fn adjacent_layers_are_fully_connected() {
    let network = build(Topology::new(3, 1, 4, 2), 4);
    let pairs: HashSet<_> = network.connections().iter()
        .map(|c| (c.source(), c.destination()))
        .collect();
    assert_eq!(pairs.len(), network.connections().len());

    for layer in 0..network.last_layer() {
        for source in network.layer(layer) {
            assert_eq!(source.forward_connections().len(), network.layer(layer + 1).len());
            for destination in network.layer(layer + 1) {
                assert!(pairs.contains(&(source.id(), destination.id())));
            }
        }
    }
    for destination in network.layer(1) {
        assert_eq!(destination.backward_connections().len(), 3);
    }
    assert!(network.layer(0).iter().all(|n| n.backward_connections().is_empty()));
    assert!(network.layer(2).iter().all(|n| n.forward_connections().is_empty()));
}

#[test]
fn ids_are_local_and_match_arena_positions() {
    let a = build(Topology::new(2, 1, 3, 1), 5);
    let b = build(Topology::new(2, 1, 3, 1), 6);

    for (index, node) in a.nodes().iter().enumerate() {
        assert_eq!(node.id().0, index);
        assert_eq!(b.nodes()[index].id(), node.id());
    }
    for (index, connection) in a.connections().iter().enumerate() {
        assert_eq!(connection.id().0, index);
    }
}

#[test]
fn node_ids_ascend_with_layers() {
    let network = build(Topology::new(2, 2, 3, 2), 7);
    let layers: Vec<usize> = network.nodes().iter().map(|n| n.layer()).collect();
    let mut sorted = layers.clone();
    sorted.sort();
    assert_eq!(layers, sorted);
}

#[test]
fn initial_parameters_lie_in_their_ranges() {
    let network = build(Topology::new(10, 2, 8, 3), 8);
    assert!(network.connections().iter().all(|c| (-1.0..=1.0).contains(&c.weight())));
    assert!(network.nodes().iter().all(|n| (-15.0..=15.0).contains(&n.bias())));
}

#[test]
fn seeded_builds_are_reproducible() {
    let topology = Topology::new(4, 1, 3, 2);
    assert_eq!(build(topology, 9).parameters(), build(topology, 9).parameters());
    assert_ne!(build(topology, 9).parameters(), build(topology, 10).parameters());
}

#[test]
fn empty_layers_fail_construction() {
    for topology in [
        Topology::new(0, 1, 3, 1),
        Topology::new(2, 2, 0, 1),
        Topology::new(2, 1, 3, 0),
    ] {
        let result = Network::new(topology, ActivationScheme::Logistic);
        assert!(matches!(result, Err(NnError::Configuration { .. })), "{topology:?}");
    }
}

#[test]
fn oversized_topologies_fail_construction() {
    #[allow(unused_mut)]
    let mut candidates = vec![Topology::new(usize::MAX, 0, 0, 1), Topology::new(2, usize::MAX, 1, 1)];
    #[cfg(target_pointer_width = "64")]
    candidates.push(Topology::new(1 << 60, 0, 0, 1));
    for topology in candidates {
        let result = Network::new(topology, ActivationScheme::Logistic);
        assert!(matches!(result, Err(NnError::Configuration { .. })), "{topology:?}");
    }
}

#[test]
fn parameter_counts_follow_the_topology() {
    let topology = Topology::new(4, 2, 3, 2);
    let parameters = build(topology, 11).parameters();
    assert_eq!(parameters.weights.len(), topology.connection_count());
    assert_eq!(parameters.biases.len(), 3 + 3 + 2);
}
