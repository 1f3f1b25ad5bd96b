// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Owns the rank-2N density tensor and its state-preparation operations.

#[cfg(test)]
mod tests;

use crate::{
    contraction::reshape,
    error::{Error, Result},
    wires::MAX_WIRES,
};
use ndarray::{Array1, Array2, ArrayD};
use num_complex::Complex64;
use num_traits::Zero;

/// Absolute tolerance for trace and norm validation of prepared states.
pub const TOLERANCE: f64 = 1e-10;

/// The density matrix of an N-wire register, stored as a complex tensor of
/// rank 2N with axes `[0..N)` indexing matrix rows and `[N..2N)` matrix
/// columns. Axis `w` (and `N + w`) belongs to device wire `w`.
#[derive(Clone, Debug)]
pub struct DensityTensor {
    num_wires: usize,
    tensor: ArrayD<Complex64>,
}

impl DensityTensor {
    /// Creates the register in the computational basis state `|0…0⟩⟨0…0|`.
    pub fn new(num_wires: usize) -> Result<Self> {
        if num_wires > MAX_WIRES {
            return Err(Error::TooManyWires(num_wires));
        }
        let tensor = Self::basis_state_tensor(num_wires, 0);
        Ok(Self { num_wires, tensor })
    }

    #[must_use]
    pub fn num_wires(&self) -> usize {
        self.num_wires
    }

    /// The dimension of the matrix form, `2^N`.
    #[must_use]
    pub fn dim(&self) -> usize {
        1 << self.num_wires
    }

    #[must_use]
    pub fn tensor(&self) -> &ArrayD<Complex64> {
        &self.tensor
    }

    pub fn tensor_mut(&mut self) -> &mut ArrayD<Complex64> {
        &mut self.tensor
    }

    /// Replaces the tensor wholesale. The replacement must have the same
    /// rank-2N shape.
    pub fn set_tensor(&mut self, tensor: ArrayD<Complex64>) {
        debug_assert_eq!(tensor.ndim(), 2 * self.num_wires);
        self.tensor = tensor;
    }

    /// The `2^N × 2^N` matrix form of the state.
    #[must_use]
    pub fn as_matrix(&self) -> Array2<Complex64> {
        let dim = self.dim();
        reshape(self.tensor.clone(), &[dim, dim])
            .into_dimensionality()
            .expect("matrix form should be two-dimensional")
    }

    /// The diagonal of the matrix form.
    #[must_use]
    pub fn diagonal(&self) -> Array1<Complex64> {
        self.as_matrix().diag().to_owned()
    }

    #[must_use]
    pub fn trace(&self) -> Complex64 {
        self.diagonal().sum()
    }

    /// Resets the register to `|0…0⟩⟨0…0|`.
    pub fn reset(&mut self) {
        self.tensor = Self::basis_state_tensor(self.num_wires, 0);
    }

    /// The all-zero tensor except a single 1 at `(index, index)` of the
    /// flattened matrix view, reshaped to rank 2N.
    fn basis_state_tensor(num_wires: usize, index: usize) -> ArrayD<Complex64> {
        let dim = 1 << num_wires;
        let mut rho = Array2::<Complex64>::zeros((dim, dim));
        rho[[index, index]] = Complex64::new(1.0, 0.0);
        reshape(rho.into_dyn(), &vec![2; 2 * num_wires])
    }

    /// Overwrites the register with the computational basis state given by
    /// `bits` on `device_wires`, big-endian over device indices. All other
    /// wires are set to `|0⟩`.
    pub fn set_basis_state(&mut self, bits: &[u8], device_wires: &[usize]) -> Result<()> {
        if bits.iter().any(|bit| *bit > 1) {
            return Err(Error::BasisStateBits);
        }
        if bits.len() != device_wires.len() {
            return Err(Error::BasisStateLength);
        }

        let mut index = 0;
        for (bit, wire) in bits.iter().zip(device_wires) {
            if *bit == 1 {
                index |= 1 << (self.num_wires - 1 - wire);
            }
        }
        self.tensor = Self::basis_state_tensor(self.num_wires, index);
        Ok(())
    }

    /// Overwrites the register with the pure state `|ψ⟩⟨ψ|` built from a
    /// normalized state vector on `device_wires`. When the given wires do
    /// not span the full ordered register, the amplitudes are scattered
    /// into a full-register vector with every other wire in `|0⟩`.
    pub fn set_state_vector(&mut self, state: &[Complex64], device_wires: &[usize]) -> Result<()> {
        if state.len() != 1 << device_wires.len() {
            return Err(Error::StateVectorSize);
        }
        let norm_sqr: f64 = state.iter().map(Complex64::norm_sqr).sum();
        if (norm_sqr - 1.0).abs() > TOLERANCE {
            return Err(Error::StateVectorNorm);
        }

        let full = if self.is_full_ordered_register(device_wires) {
            state.to_vec()
        } else {
            let k = device_wires.len();
            let mut scattered = vec![Complex64::zero(); self.dim()];
            for (sub, amplitude) in state.iter().enumerate() {
                let mut index = 0;
                for (t, wire) in device_wires.iter().enumerate() {
                    if (sub >> (k - 1 - t)) & 1 == 1 {
                        index |= 1 << (self.num_wires - 1 - wire);
                    }
                }
                scattered[index] = *amplitude;
            }
            scattered
        };

        let dim = self.dim();
        let rho = Array2::from_shape_fn((dim, dim), |(i, j)| full[i] * full[j].conj());
        self.tensor = reshape(rho.into_dyn(), &vec![2; 2 * self.num_wires]);
        Ok(())
    }

    /// Overwrites the state on `device_wires` with the given density
    /// matrix. When the wires do not span the full ordered register, the
    /// new state is `tr_in(ρ) ⊗ ρ_in` with axes permuted back to the
    /// original wire order, so the reduced state on the complement wires
    /// is preserved.
    pub fn set_density_matrix(
        &mut self,
        matrix: &Array2<Complex64>,
        device_wires: &[usize],
    ) -> Result<()> {
        let sub_dim = 1 << device_wires.len();
        if matrix.shape() != [sub_dim, sub_dim] {
            return Err(Error::DensityMatrixSize);
        }
        let trace: Complex64 = matrix.diag().sum();
        if (trace - Complex64::new(1.0, 0.0)).norm() > TOLERANCE {
            return Err(Error::DensityMatrixTrace);
        }

        if self.is_full_ordered_register(device_wires) {
            self.tensor = reshape(matrix.clone().into_dyn(), &vec![2; 2 * self.num_wires]);
            return Ok(());
        }

        let complement: Vec<usize> = (0..self.num_wires)
            .filter(|wire| !device_wires.contains(wire))
            .collect();
        let sigma = self.partial_trace(&complement);
        let rho = kron(&sigma, matrix);
        let rho = reshape(rho.into_dyn(), &vec![2; 2 * self.num_wires]);

        // The Kronecker product places the complement wires first; permute
        // each wire's row and column axis back to its device position.
        let mut perm = vec![0; 2 * self.num_wires];
        for wire in 0..self.num_wires {
            let source = if let Some(pos) = device_wires.iter().position(|w| *w == wire) {
                complement.len() + pos
            } else {
                complement
                    .iter()
                    .position(|w| *w == wire)
                    .expect("wire should be in the complement")
            };
            perm[wire] = source;
            perm[self.num_wires + wire] = source + self.num_wires;
        }
        self.tensor = rho.permuted_axes(ndarray::IxDyn(&perm));

        debug_assert!((self.trace() - Complex64::new(1.0, 0.0)).norm() < TOLERANCE);
        Ok(())
    }

    /// The reduced density matrix over `keep`, tracing out every other
    /// wire. The rows and columns of the result follow the order of
    /// `keep`.
    #[must_use]
    pub fn partial_trace(&self, keep: &[usize]) -> Array2<Complex64> {
        let matrix = self.as_matrix();
        let rest: Vec<usize> = (0..self.num_wires)
            .filter(|wire| !keep.contains(wire))
            .collect();

        let kept_dim = 1 << keep.len();
        let rest_dim = 1 << rest.len();
        let mut reduced = Array2::<Complex64>::zeros((kept_dim, kept_dim));

        for a in 0..kept_dim {
            for b in 0..kept_dim {
                let mut sum = Complex64::zero();
                for r in 0..rest_dim {
                    let i = self.compose_index(a, keep, r, &rest);
                    let j = self.compose_index(b, keep, r, &rest);
                    sum += matrix[[i, j]];
                }
                reduced[[a, b]] = sum;
            }
        }
        reduced
    }

    /// Builds a full-register row index from sub-indices over two disjoint
    /// wire groups, each big-endian in its group order.
    fn compose_index(&self, kept: usize, keep: &[usize], rest_bits: usize, rest: &[usize]) -> usize {
        let mut index = 0;
        for (t, wire) in keep.iter().enumerate() {
            if (kept >> (keep.len() - 1 - t)) & 1 == 1 {
                index |= 1 << (self.num_wires - 1 - wire);
            }
        }
        for (t, wire) in rest.iter().enumerate() {
            if (rest_bits >> (rest.len() - 1 - t)) & 1 == 1 {
                index |= 1 << (self.num_wires - 1 - wire);
            }
        }
        index
    }

    fn is_full_ordered_register(&self, device_wires: &[usize]) -> bool {
        device_wires.len() == self.num_wires
            && device_wires.windows(2).all(|pair| pair[0] < pair[1])
    }
}

/// Kronecker product of two square complex matrices.
#[must_use]
pub fn kron(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    let (ar, ac) = a.dim();
    let (br, bc) = b.dim();
    Array2::from_shape_fn((ar * br, ac * bc), |(i, j)| {
        a[[i / br, j / bc]] * b[[i % br, j % bc]]
    })
}
