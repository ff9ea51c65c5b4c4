use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use nodenet::{
    train_loop, ActivationScheme, Coordinator, CoordinatorConfig, CostHistory, CostReport, RandomSampler,
    Sample, Topology, TrainConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> nodenet::Result<()> {
    env_logger::init();

    let samples = vec![
        Sample::new(vec![1.0, 0.0], 1),
        Sample::new(vec![1.0, 1.0], 0),
        Sample::new(vec![0.0, 1.0], 1),
        Sample::new(vec![0.0, 0.0], 0),
    ];

    let mut config = CoordinatorConfig::new(Topology::new(2, 1, 4, 2));
    config.scheme = ActivationScheme::Logistic;
    config.replicas = 4;
    config.learning_rate = 0.25;
    config.learning_rate_step = 0.25;
    config.seed = Some(42);

    let mut coordinator = Coordinator::new(config)?;
    let history = Arc::new(Mutex::new(CostHistory::new()));
    coordinator.attach_monitor(history.clone());

    let (progress_tx, progress_rx) = mpsc::channel::<CostReport>();
    let printer = thread::spawn(move || {
        for report in progress_rx {
            let costs: Vec<String> = report.replicas.iter()
                .map(|r| format!("{:.4}", r.mean_cost))
                .collect();
            println!("{:>6} cycles: mean cost per replica [{}]", report.cycles, costs.join(", "));
        }
    });

    let mut source = RandomSampler::new(samples.clone(), StdRng::seed_from_u64(7));
    println!("Drawing with replacement from {} XOR samples", source.len());
    let mut train_config = TrainConfig::new(Some(20_000), 2_000);
    train_config.progress_tx = Some(progress_tx);
    train_loop(&mut coordinator, &mut source, &train_config)?;
    drop(train_config);
    let _ = printer.join();

    for sample in &samples {
        let outputs = coordinator.evaluate(&sample.input)?;
        let predictions: Vec<String> = outputs.into_iter()
            .map(|o| o.map(|v| format!("{:.3}", v[1])).unwrap_or_else(|e| e.to_string()))
            .collect();
        println!("Input: {:?} (label {}) -> P(1) per replica: [{}]", sample.input, sample.label, predictions.join(", "));
    }

    if let Ok(history) = history.lock() {
        if let Some((lo, hi)) = history.bounds() {
            println!("mean cost ranged from {lo:.4} to {hi:.4}");
        }
        for line in history.line_ids() {
            println!(
                "line {line} (LR = {:.2}): {} points",
                history.learning_rate(line).unwrap_or(0.0),
                history.line(line).len()
            );
        }
    }
    Ok(())
}
