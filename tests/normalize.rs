use approx::assert_relative_eq;

use dnn_classifier::{Matrix, Normalization};

#[test]
fn fit_finds_per_feature_extrema() {
    let data = Matrix::from_rows(vec![
        vec![1.0, 10.0],
        vec![3.0, -5.0],
        vec![2.0, 0.0],
    ]);

    let normalization = Normalization::fit(&data);

    assert_eq!(normalization.min, vec![1.0, -5.0]);
    assert_eq!(normalization.max, vec![3.0, 10.0]);
}

#[test]
fn apply_then_invert_round_trips() {
    let original = Matrix::from_rows(vec![
        vec![1.0, 10.0],
        vec![3.0, -5.0],
        vec![2.0, 0.0],
    ]);

    let normalization = Normalization::fit(&original);

    let mut data = original.clone();
    normalization.apply(&mut data);

    // Normalized values land in [0, 1].
    for &v in data.as_slice() {
        assert!((0.0..=1.0).contains(&v));
    }

    normalization.invert(&mut data);

    for (restored, expected) in data.as_slice().iter().zip(original.as_slice()) {
        assert_relative_eq!(*restored, *expected, epsilon = 1e-12);
    }
}

#[test]
fn constant_feature_normalizes_to_zero() {
    let mut data = Matrix::from_rows(vec![
        vec![7.0, 1.0],
        vec![7.0, 2.0],
        vec![7.0, 3.0],
    ]);

    let normalization = Normalization::fit(&data);
    normalization.apply(&mut data);

    for row in 0..data.rows() {
        assert_eq!(data.at(row, 0), 0.0);
        assert!(!data.at(row, 1).is_nan());
    }
}

#[test]
#[should_panic(expected = "features")]
fn apply_rejects_mismatched_feature_counts() {
    let normalization = Normalization {
        min: vec![0.0, 0.0],
        max: vec![1.0, 1.0],
    };

    let mut data = Matrix::zeros(2, 3);
    normalization.apply(&mut data);
}
