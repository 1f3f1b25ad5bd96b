// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Measurement processes, observables, and the entropic quantities
//! computed from reduced density matrices.

use crate::{
    gates::{self, Gate},
    wires::WireLabel,
};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use rustc_hash::FxHashMap;

/// An observable decomposed into its eigenvalues plus the rotations that
/// diagonalize it in the computational basis.
#[derive(Clone, Debug)]
pub struct Observable {
    pub name: &'static str,
    pub wires: Vec<WireLabel>,
    pub eigvals: Vec<f64>,
    pub diagonalizing_gates: Vec<Gate>,
}

impl Observable {
    pub fn pauli_z(wire: impl Into<WireLabel>) -> Self {
        Self {
            name: "PauliZ",
            wires: vec![wire.into()],
            eigvals: vec![1.0, -1.0],
            diagonalizing_gates: Vec::new(),
        }
    }

    pub fn pauli_x(wire: impl Into<WireLabel>) -> Self {
        let wire = wire.into();
        Self {
            name: "PauliX",
            wires: vec![wire.clone()],
            eigvals: vec![1.0, -1.0],
            diagonalizing_gates: vec![gates::h(wire)],
        }
    }

    pub fn pauli_y(wire: impl Into<WireLabel>) -> Self {
        let wire = wire.into();
        Self {
            name: "PauliY",
            wires: vec![wire.clone()],
            eigvals: vec![1.0, -1.0],
            diagonalizing_gates: vec![
                gates::z(wire.clone()),
                gates::s(wire.clone()),
                gates::h(wire),
            ],
        }
    }
}

/// A requested measurement process.
#[derive(Clone, Debug)]
pub enum Measurement {
    /// The full pre-rotation density matrix.
    State,
    /// The reduced density matrix over the given wires.
    DensityMatrix { wires: Vec<WireLabel> },
    /// Computational-basis probabilities over the given wires
    /// (all wires when empty).
    Probability { wires: Vec<WireLabel> },
    Expectation { observable: Observable },
    Variance { observable: Observable },
    Purity { wires: Vec<WireLabel> },
    VnEntropy {
        wires: Vec<WireLabel>,
        log_base: Option<f64>,
    },
    MutualInfo {
        wires0: Vec<WireLabel>,
        wires1: Vec<WireLabel>,
        log_base: Option<f64>,
    },
    /// Per-shot computational-basis samples over the given wires
    /// (all wires when empty).
    Sample { wires: Vec<WireLabel> },
    /// Aggregated sample counts keyed by bitstring.
    Counts { wires: Vec<WireLabel> },
}

impl Measurement {
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Measurement::State => "State",
            Measurement::DensityMatrix { .. } => "DensityMatrix",
            Measurement::Probability { .. } => "Probability",
            Measurement::Expectation { .. } => "Expectation",
            Measurement::Variance { .. } => "Variance",
            Measurement::Purity { .. } => "Purity",
            Measurement::VnEntropy { .. } => "VnEntropy",
            Measurement::MutualInfo { .. } => "MutualInfo",
            Measurement::Sample { .. } => "Sample",
            Measurement::Counts { .. } => "Counts",
        }
    }

    /// Whether the result is derived from the exact pre-rotation state,
    /// which readout error by definition cannot affect.
    #[must_use]
    pub fn is_state_type(&self) -> bool {
        matches!(self, Measurement::State | Measurement::DensityMatrix { .. })
    }

    /// Entropy-type measurements are computed prior to measurement and
    /// never contribute wires to the readout-error set.
    #[must_use]
    pub fn is_entropy_type(&self) -> bool {
        matches!(
            self,
            Measurement::VnEntropy { .. } | Measurement::MutualInfo { .. }
        )
    }

    #[must_use]
    pub fn observable(&self) -> Option<&Observable> {
        match self {
            Measurement::Expectation { observable } | Measurement::Variance { observable } => {
                Some(observable)
            }
            _ => None,
        }
    }

    /// The wires this measurement touches, for readout-error
    /// accumulation.
    #[must_use]
    pub fn wires(&self) -> Vec<WireLabel> {
        match self {
            Measurement::State => Vec::new(),
            Measurement::DensityMatrix { wires }
            | Measurement::Probability { wires }
            | Measurement::Purity { wires }
            | Measurement::VnEntropy { wires, .. }
            | Measurement::Sample { wires }
            | Measurement::Counts { wires } => wires.clone(),
            Measurement::Expectation { observable } | Measurement::Variance { observable } => {
                observable.wires.clone()
            }
            Measurement::MutualInfo { wires0, wires1, .. } => {
                let mut wires = wires0.clone();
                wires.extend(wires1.iter().cloned());
                wires
            }
        }
    }
}

/// One measurement result, in the representation its process calls for.
#[derive(Clone, Debug)]
pub enum MeasurementValue {
    Scalar(f64),
    Probabilities(Array1<f64>),
    Matrix(Array2<Complex64>),
    /// One row of bits per shot.
    Samples(Vec<Vec<u8>>),
    Counts(FxHashMap<String, usize>),
}

/// `Tr(σ²)` of a reduced density matrix.
#[must_use]
pub fn purity_of(sigma: &Array2<Complex64>) -> f64 {
    sigma.dot(sigma).diag().sum().re
}

/// Von Neumann entropy `-Σ λ log λ` over the eigenvalues of a reduced
/// density matrix. Natural log unless `log_base` is given.
#[must_use]
pub fn vn_entropy_of(sigma: &Array2<Complex64>, log_base: Option<f64>) -> f64 {
    let dim = sigma.nrows();
    let hermitian = DMatrix::from_fn(dim, dim, |i, j| sigma[[i, j]]);
    let eigvals = hermitian.symmetric_eigenvalues();

    let mut entropy = 0.0;
    for lambda in &eigvals {
        if *lambda > crate::density_tensor::TOLERANCE {
            entropy -= lambda * lambda.ln();
        }
    }
    match log_base {
        Some(base) => entropy / base.ln(),
        None => entropy,
    }
}
