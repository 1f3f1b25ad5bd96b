// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{DensityTensor, kron};
use crate::error::Error;
use ndarray::{Array2, array};
use num_complex::Complex64;

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

fn assert_matrix_close(actual: &Array2<Complex64>, expected: &Array2<Complex64>) {
    assert_eq!(actual.shape(), expected.shape());
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).norm() < 1e-12, "expected {e}, got {a}");
    }
}

#[test]
fn new_register_is_all_zero_state() {
    let state = DensityTensor::new(2).expect("register should build");
    assert_eq!(state.dim(), 4);
    assert_eq!(state.tensor().ndim(), 4);

    let matrix = state.as_matrix();
    assert_eq!(matrix[[0, 0]], c(1., 0.));
    assert!((state.trace() - c(1., 0.)).norm() < 1e-12);
}

#[test]
fn more_than_23_wires_is_rejected() {
    assert_eq!(DensityTensor::new(24).expect_err("should fail"), Error::TooManyWires(24));
}

#[test]
fn basis_state_sets_the_matching_diagonal_entry() {
    let mut state = DensityTensor::new(3).expect("register should build");
    state
        .set_basis_state(&[1, 0, 1], &[0, 1, 2])
        .expect("valid basis state");

    let diagonal = state.diagonal();
    for (index, value) in diagonal.iter().enumerate() {
        let expected = if index == 0b101 { 1.0 } else { 0.0 };
        assert!((value - c(expected, 0.)).norm() < 1e-12);
    }
}

#[test]
fn basis_state_on_a_subset_leaves_other_wires_at_zero() {
    let mut state = DensityTensor::new(3).expect("register should build");
    state.set_basis_state(&[1], &[1]).expect("valid basis state");
    assert!((state.diagonal()[0b010] - c(1., 0.)).norm() < 1e-12);
}

#[test]
fn basis_state_rejects_bad_bits_and_lengths() {
    let mut state = DensityTensor::new(2).expect("register should build");
    assert_eq!(
        state.set_basis_state(&[2, 0], &[0, 1]),
        Err(Error::BasisStateBits)
    );
    assert_eq!(
        state.set_basis_state(&[1], &[0, 1]),
        Err(Error::BasisStateLength)
    );
}

#[test]
fn state_vector_norm_is_validated() {
    let mut state = DensityTensor::new(1).expect("register should build");
    assert_eq!(
        state.set_state_vector(&[c(0.6, 0.), c(0.6, 0.)], &[0]),
        Err(Error::StateVectorNorm)
    );
    assert!(state.set_state_vector(&[c(0.6, 0.), c(0.8, 0.)], &[0]).is_ok());
    assert_eq!(
        state.set_state_vector(&[c(1., 0.)], &[0]),
        Err(Error::StateVectorSize)
    );
}

#[test]
fn state_vector_builds_the_outer_product() {
    let mut state = DensityTensor::new(1).expect("register should build");
    state
        .set_state_vector(&[c(0.6, 0.), c(0., 0.8)], &[0])
        .expect("normalized state");

    let expected = array![[c(0.36, 0.), c(0., -0.48)], [c(0., 0.48), c(0.64, 0.)]];
    assert_matrix_close(&state.as_matrix(), &expected);
}

#[test]
fn state_vector_on_a_subset_scatters_amplitudes() {
    let mut state = DensityTensor::new(2).expect("register should build");
    state
        .set_state_vector(&[c(0., 0.), c(1., 0.)], &[1])
        .expect("normalized state");

    // Wire 1 in |1⟩, wire 0 stays in |0⟩, so the state is |01⟩⟨01|.
    let diagonal = state.diagonal();
    assert!((diagonal[0b01] - c(1., 0.)).norm() < 1e-12);
    assert!(diagonal[0b00].norm() < 1e-12);
    assert!(diagonal[0b10].norm() < 1e-12);
}

#[test]
fn full_density_matrix_is_set_verbatim() {
    let mut state = DensityTensor::new(1).expect("register should build");
    let mixed = array![[c(0.5, 0.), c(0., 0.)], [c(0., 0.), c(0.5, 0.)]];
    state.set_density_matrix(&mixed, &[0]).expect("valid matrix");
    assert_matrix_close(&state.as_matrix(), &mixed);
}

#[test]
fn density_matrix_trace_and_shape_are_validated() {
    let mut state = DensityTensor::new(1).expect("register should build");
    let unnormalized = array![[c(0.5, 0.), c(0., 0.)], [c(0., 0.), c(0.6, 0.)]];
    assert_eq!(
        state.set_density_matrix(&unnormalized, &[0]),
        Err(Error::DensityMatrixTrace)
    );
    let wrong_size = Array2::<Complex64>::eye(4);
    assert_eq!(
        state.set_density_matrix(&wrong_size, &[0]),
        Err(Error::DensityMatrixSize)
    );
}

#[test]
fn partial_density_matrix_composes_with_the_untouched_wires() {
    let mut state = DensityTensor::new(2).expect("register should build");
    state.set_basis_state(&[1], &[0]).expect("valid basis state");

    let mixed = array![[c(0.25, 0.), c(0., 0.)], [c(0., 0.), c(0.75, 0.)]];
    state.set_density_matrix(&mixed, &[1]).expect("valid matrix");

    // Wire 0 stays in |1⟩⟨1|; the joint state is its product with the new
    // wire-1 state.
    let one = array![[c(0., 0.), c(0., 0.)], [c(0., 0.), c(1., 0.)]];
    assert_matrix_close(&state.as_matrix(), &kron(&one, &mixed));
}

#[test]
fn partial_density_matrix_respects_wire_positions() {
    let mut state = DensityTensor::new(2).expect("register should build");
    state.set_basis_state(&[1], &[1]).expect("valid basis state");

    let mixed = array![[c(0.25, 0.), c(0., 0.)], [c(0., 0.), c(0.75, 0.)]];
    state.set_density_matrix(&mixed, &[0]).expect("valid matrix");

    // The new state targets wire 0, so the product order is reversed
    // relative to the kron of (complement, replacement).
    let one = array![[c(0., 0.), c(0., 0.)], [c(0., 0.), c(1., 0.)]];
    assert_matrix_close(&state.as_matrix(), &kron(&mixed, &one));
}

#[test]
fn partial_trace_of_bell_state_is_maximally_mixed() {
    let mut state = DensityTensor::new(2).expect("register should build");
    let amp = c(0.5_f64.sqrt(), 0.);
    state
        .set_state_vector(&[amp, c(0., 0.), c(0., 0.), amp], &[0, 1])
        .expect("normalized state");

    let expected = array![[c(0.5, 0.), c(0., 0.)], [c(0., 0.), c(0.5, 0.)]];
    assert_matrix_close(&state.partial_trace(&[0]), &expected);
    assert_matrix_close(&state.partial_trace(&[1]), &expected);
}

#[test]
fn partial_trace_follows_keep_order() {
    let mut state = DensityTensor::new(2).expect("register should build");
    state.set_basis_state(&[0, 1], &[0, 1]).expect("valid basis state");

    // Keeping [1, 0] makes wire 1 the high bit, so |01⟩ reads as |10⟩.
    let swapped = state.partial_trace(&[1, 0]);
    assert!((swapped[[2, 2]] - c(1., 0.)).norm() < 1e-12);
}

#[test]
fn reset_returns_to_the_zero_state_idempotently() {
    let mut state = DensityTensor::new(2).expect("register should build");
    state.set_basis_state(&[1, 1], &[0, 1]).expect("valid basis state");

    state.reset();
    let after_once = state.as_matrix();
    state.reset();
    assert_matrix_close(&state.as_matrix(), &after_once);
    assert!((after_once[[0, 0]] - c(1., 0.)).norm() < 1e-12);
}

#[test]
fn kron_of_single_qubit_matrices() {
    let a = array![[c(1., 0.), c(0., 0.)], [c(0., 0.), c(2., 0.)]];
    let b = array![[c(0., 0.), c(3., 0.)], [c(4., 0.), c(0., 0.)]];
    let product = kron(&a, &b);
    assert_eq!(product.dim(), (4, 4));
    assert_eq!(product[[0, 1]], c(3., 0.));
    assert_eq!(product[[1, 0]], c(4., 0.));
    assert_eq!(product[[2, 3]], c(6., 0.));
    assert_eq!(product[[3, 2]], c(8., 0.));
}
