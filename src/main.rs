// This binary is intentionally minimal.
// All network logic lives in the library (src/lib.rs and its modules).
// Run the demo with:
//   cargo run --example xor
use nodenet::{CoordinatorConfig, Network};

fn main() {
    env_logger::init();

    let Some(path) = std::env::args().nth(1) else {
        println!("nodenet: a node-graph neural network trained across concurrent replicas.");
        println!("Pass a coordinator config (JSON) to inspect it, or run `cargo run --example xor`.");
        return;
    };

    let config = match CoordinatorConfig::load_json(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("cannot load {path}: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = config.validate().and_then(|_| Network::new(config.topology, config.scheme)) {
        eprintln!("{path} is not a usable configuration: {e}");
        std::process::exit(1);
    }

    let topology = config.topology;
    println!("layers:      {:?}", topology.layer_sizes());
    println!("nodes:       {}", topology.node_count());
    println!("connections: {}", topology.connection_count());
    println!("scheme:      {:?}", config.scheme);
    println!("replicas:    {} (learning rates {:?})", config.replicas, config.learning_rates());
}
