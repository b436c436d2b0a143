use std::env;

use rand::Rng;

use dnn_classifier::{
    load_model, save_model, train_network, Matrix, Network, Normalization, TrainConfig,
    TrainingMethod, TrainingOptions,
};

fn main() {
    let mut rng = rand::thread_rng();
    let centers = [(2.0, 2.0), (8.0, 2.0), (5.0, 8.0)];

    let mut rows = Vec::new();
    let mut targets = Vec::new();

    for (index, &(cx, cy)) in centers.iter().enumerate() {
        for _ in 0..30 {
            rows.push(vec![
                cx + rng.gen_range(-1.0..1.0),
                cy + rng.gen_range(-1.0..1.0),
            ]);
            targets.push(vec![(index + 1) as f64]);
        }
    }

    let mut input = Matrix::from_rows(rows);
    let labels = Matrix::from_rows(targets);

    let normalization = Normalization::fit(&input);
    normalization.apply(&mut input);

    let opts = TrainingOptions {
        alpha: 1.0,
        epochs: 500,
        inputs: 2,
        nodes: 8,
        items: input.rows(),
        categories: 3,
        tolerance: 0.01,
        hidden_layers: 1,
        use_l2: false,
    };

    let mut network = Network::new();
    let config = TrainConfig::new(TrainingMethod::ConjugateGradient, true);
    let outcome = train_network(&mut network, &input, &labels, &opts, &config);

    println!(
        "trained: {} iterations, cost = {:.6}, converged = {}",
        outcome.iterations, outcome.cost, outcome.converged
    );

    let dir = env::temp_dir();
    save_model(&dir, "clusters", &network, Some(&normalization)).expect("save model");
    println!("saved model to {}", dir.join("clusters.json").display());

    let (mut loaded, _) = load_model(&dir, "clusters").expect("load model");

    let classes = loaded.classify(&input, &opts, 0.5);
    let mut correct = 0;
    for (row, class) in classes.iter().enumerate() {
        if *class == labels.at(row, 0) as usize {
            correct += 1;
        }
    }

    println!(
        "reloaded model classifies {}/{} training points correctly",
        correct,
        input.rows()
    );
}
