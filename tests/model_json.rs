use std::fs;

use dnn_classifier::{
    from_json, load_model, save_model, to_json, Error, Matrix, Network, Normalization,
};

fn sample_network() -> Network {
    Network::from_weights(vec![
        Matrix::from_rows(vec![
            vec![0.1, -0.2, 0.3],
            vec![0.4, 0.5, -0.6],
        ]),
        Matrix::from_rows(vec![vec![-0.7, 0.8, 0.9]]),
    ])
}

fn sample_normalization() -> Normalization {
    Normalization {
        min: vec![-1.0, 0.0],
        max: vec![1.0, 10.0],
    }
}

#[test]
fn round_trip_preserves_weights_and_normalization() {
    let network = sample_network();
    let normalization = sample_normalization();

    let json = to_json(&network, Some(&normalization)).unwrap();
    let (loaded, loaded_norm) = from_json(&json).unwrap();

    assert_eq!(loaded.weights, network.weights);
    assert_eq!(loaded_norm, Some(normalization));
}

#[test]
fn architecture_is_inferred_from_the_matrices() {
    let json = to_json(&sample_network(), None).unwrap();
    let (loaded, _) = from_json(&json).unwrap();

    assert_eq!(loaded.inputs(), 2);
    assert_eq!(loaded.categories(), 1);
    assert_eq!(loaded.hidden_layers(), 1);
}

#[test]
fn missing_normalization_field_still_loads() {
    // Older schema revisions persist only the weights.
    let json = r#"{"Weights":[[[0.1,0.2,0.3]]]}"#;
    let (loaded, normalization) = from_json(json).unwrap();

    assert!(normalization.is_none());
    assert_eq!(loaded.inputs(), 2);
    assert_eq!(loaded.categories(), 1);
    assert_eq!(loaded.hidden_layers(), 0);
}

#[test]
fn malformed_json_fails_to_parse() {
    let err = from_json("not a model").unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[test]
fn empty_weight_list_is_rejected() {
    let err = from_json(r#"{"Weights":[]}"#).unwrap_err();
    assert!(matches!(err, Error::InvalidModel(_)));
}

#[test]
fn ragged_weight_matrix_is_rejected() {
    let json = r#"{"Weights":[[[0.1,0.2,0.3],[0.4,0.5]]]}"#;
    let err = from_json(json).unwrap_err();
    assert!(matches!(err, Error::InvalidModel(_)));
}

#[test]
fn inconsistent_layer_shapes_are_rejected() {
    // Layer 0 produces 2 outputs but layer 1 expects 3 inputs.
    let json = r#"{"Weights":[
        [[0.1,0.2,0.3],[0.4,0.5,0.6]],
        [[0.1,0.2,0.3,0.4]]
    ]}"#;
    let err = from_json(json).unwrap_err();
    assert!(matches!(err, Error::InvalidModel(_)));
}

#[test]
fn bad_normalization_block_is_rejected() {
    let json = r#"{"Weights":[[[0.1,0.2,0.3]]],"Normalization":[[0.0,0.0],[1.0,1.0],[2.0,2.0]]}"#;
    let err = from_json(json).unwrap_err();
    assert!(matches!(err, Error::InvalidModel(_)));
}

#[test]
fn save_and_load_round_trips_through_a_file() {
    let dir = std::env::temp_dir().join(format!("dnn_classifier_test_{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();

    let network = sample_network();
    let normalization = sample_normalization();

    save_model(&dir, "model", &network, Some(&normalization)).unwrap();
    let (loaded, loaded_norm) = load_model(&dir, "model").unwrap();

    assert_eq!(loaded.weights, network.weights);
    assert_eq!(loaded_norm, Some(normalization));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn loading_a_missing_file_is_an_io_error() {
    let err = load_model(std::env::temp_dir().as_path(), "no_such_model_here").unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
