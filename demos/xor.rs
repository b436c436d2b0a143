use dnn_classifier::{Matrix, Network, TrainingOptions};

fn main() {
    let input = Matrix::from_rows(vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ]);
    let labels = Matrix::from_rows(vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]]);

    let opts = TrainingOptions {
        alpha: 2.0,
        epochs: 20_000,
        inputs: 2,
        nodes: 4,
        items: 4,
        categories: 1,
        tolerance: 0.01,
        hidden_layers: 1,
        use_l2: false,
    };

    let mut network = Network::new();
    network.setup(&labels, &opts, true);

    while !network.step(&input, &opts) {
        if network.iterations % 1000 == 0 {
            println!(
                "iteration {}: cost = {:.6}, l2 = {:.6}",
                network.iterations, network.cost, network.l2
            );
        }
    }

    println!(
        "converged after {} iterations (cost = {:.6})",
        network.iterations, network.cost
    );

    let classes = network.classify(&input, &opts, 0.5);
    for (row, class) in classes.iter().enumerate() {
        println!("input {:?} -> {}", input.row(row), class);
    }
}
