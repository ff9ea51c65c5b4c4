// Tests for parameter persistence: binary streams, per-replica files, JSON
// snapshots and configs.

use std::path::PathBuf;

use nodenet::{
    ActivationScheme, Coordinator, CoordinatorConfig, Network, NnError, ParameterStore, Parameters,
    Snapshot, Topology,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("nodenet-test-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn config(seed: u64) -> CoordinatorConfig {
    let mut config = CoordinatorConfig::new(Topology::new(4, 2, 3, 2));
    config.replicas = 2;
    config.seed = Some(seed);
    config.shared_init = false;
    config
}

#[test]
fn network_round_trip_reproduces_outputs() {
    let dir = scratch_dir("network-round-trip");
    let topology = Topology::new(5, 2, 4, 3);
    let input = [0.1, 0.9, -0.4, 0.3, 0.0];

    let mut trained = Network::build(topology, ActivationScheme::LeakyTanh, &mut StdRng::seed_from_u64(1)).unwrap();
    trained.train_cycle(&input, &[0.0, 1.0, 0.0], 0.05).unwrap();
    let expected = trained.forward(&input).unwrap();

    let store = ParameterStore::new(dir.join("weights.bin"), dir.join("biases.bin"));
    store.save(&trained.parameters()).unwrap();
    assert_eq!(
        std::fs::metadata(&store.weights_path).unwrap().len() as usize,
        topology.connection_count() * 8
    );
    assert_eq!(
        std::fs::metadata(&store.biases_path).unwrap().len() as usize,
        topology.bias_count() * 8
    );

    let mut fresh = Network::build(topology, ActivationScheme::LeakyTanh, &mut StdRng::seed_from_u64(2)).unwrap();
    fresh.load_parameters(&store.load(&topology).unwrap()).unwrap();
    assert_eq!(fresh.forward(&input).unwrap(), expected);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn loading_into_a_different_topology_fails_cleanly() {
    let dir = scratch_dir("mismatch");
    let small = Topology::new(2, 1, 2, 1);
    let large = Topology::new(2, 1, 3, 1);

    let network = Network::new(small, ActivationScheme::Logistic).unwrap();
    let store = ParameterStore::new(dir.join("w.bin"), dir.join("b.bin"));
    store.save(&network.parameters()).unwrap();

    assert!(matches!(store.load(&large), Err(NnError::Persistence { .. })));

    let mut other = Network::new(large, ActivationScheme::Logistic).unwrap();
    let before = other.parameters();
    let err = other.load_parameters(&network.parameters()).unwrap_err();
    assert!(matches!(err, NnError::Persistence { .. }));
    assert_eq!(other.parameters(), before);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn coordinator_round_trip_reproduces_every_replica() {
    let dir = scratch_dir("coordinator-round-trip");
    let input = [0.2, 0.4, 0.6, 0.8];

    let mut source = Coordinator::new(config(3)).unwrap();
    for _ in 0..5 {
        source.train_step(&input, &[1.0, 0.0]).unwrap();
    }
    let expected = source.evaluate(&input).unwrap();
    source.save_parameters(&dir).unwrap();
    assert!(dir.join("replica-1-biases.bin").exists());

    let target = Coordinator::new(config(99)).unwrap();
    target.load_parameters(&dir).unwrap();
    let restored = target.evaluate(&input).unwrap();

    for (a, b) in expected.iter().zip(&restored) {
        assert_eq!(a.as_ref().unwrap(), b.as_ref().unwrap());
    }
    assert_eq!(source.export_parameters().unwrap(), target.export_parameters().unwrap());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn truncated_replica_files_leave_every_replica_untouched() {
    let dir = scratch_dir("truncated");
    let source = Coordinator::new(config(3)).unwrap();
    source.save_parameters(&dir).unwrap();

    let weights = dir.join("replica-1-weights.bin");
    let mut bytes = std::fs::read(&weights).unwrap();
    bytes.truncate(bytes.len() - 3);
    std::fs::write(&weights, bytes).unwrap();

    let target = Coordinator::new(config(4)).unwrap();
    let before = target.export_parameters().unwrap();
    let err = target.load_parameters(&dir).unwrap_err();
    assert!(matches!(err, NnError::Persistence { .. }));
    assert_eq!(target.export_parameters().unwrap(), before);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_replica_files_are_persistence_errors() {
    let dir = scratch_dir("missing");
    let coordinator = Coordinator::new(config(3)).unwrap();
    assert!(matches!(coordinator.load_parameters(&dir), Err(NnError::Persistence { .. })));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn import_spreads_a_single_set_over_all_replicas() {
    let coordinator = Coordinator::new(config(5)).unwrap();
    let first = coordinator.export_parameters().unwrap().remove(0);
    coordinator.import_parameters(std::slice::from_ref(&first)).unwrap();
    assert!(coordinator.export_parameters().unwrap().iter().all(|p| p == &first));

    let three = vec![first.clone(), first.clone(), first];
    assert!(matches!(coordinator.import_parameters(&three), Err(NnError::Persistence { .. })));

    let bad = Parameters::new(vec![0.0; 2], vec![0.0; 2]);
    assert!(matches!(coordinator.import_parameters(&[bad]), Err(NnError::Persistence { .. })));
}

#[test]
fn snapshots_restore_through_json() {
    let dir = scratch_dir("snapshot");
    let path = dir.join("snapshot.json");

    let mut source = Coordinator::new(config(7)).unwrap();
    source.train_step(&[0.5, 0.5, 0.5, 0.5], &[0.0, 1.0]).unwrap();
    source.snapshot().unwrap().save_json(&path).unwrap();

    let snapshot = Snapshot::load_json(&path).unwrap();
    assert_eq!(snapshot.replicas.len(), 2);

    let target = Coordinator::new(config(8)).unwrap();
    target.restore(&snapshot).unwrap();
    assert_eq!(target.export_parameters().unwrap(), source.export_parameters().unwrap());

    let mut other_shape = config(8);
    other_shape.topology = Topology::new(4, 1, 3, 2);
    let mismatched = Coordinator::new(other_shape).unwrap();
    assert!(matches!(mismatched.restore(&snapshot), Err(NnError::Persistence { .. })));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn coordinator_configs_survive_json() {
    let dir = scratch_dir("config");
    let path = dir.join("config.json");
    let mut config = config(21);
    config.scheme = ActivationScheme::LeakyTanh;
    config.learning_rate_step = 0.05;

    config.save_json(&path).unwrap();
    assert_eq!(CoordinatorConfig::load_json(&path).unwrap(), config);

    std::fs::remove_dir_all(&dir).unwrap();
}
