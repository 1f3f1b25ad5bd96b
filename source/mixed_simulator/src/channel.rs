// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Applies quantum channels to subsets of the density tensor.
//!
//! A channel is given by Kraus operators `{K_i}` and maps
//! `ρ → Σ_i K_i ρ K_i†`, where each `K_i` acts on the row axes of the
//! target wires and `K_i†` on the matching column axes. A unitary gate is
//! the single-element case. Three strategies are implemented; they differ
//! only in cost, never in result.


use crate::{
    contraction::{Labeled, conj, labeled_contract, moveaxis, reshape, tensordot},
    density_tensor::DensityTensor,
};
use log::trace;
use ndarray::{Array1, Array2, ArrayD, IxDyn};
use num_complex::Complex64;

/// Wire-count threshold above which the direct-axis strategy is chosen.
/// This is a tunable performance default, not a semantic contract.
const TENSORDOT_WIRE_THRESHOLD: usize = 2;

/// The effect of one operation on the density tensor, resolved once per
/// operation from the operator's capability queries.
#[derive(Clone, Debug)]
pub enum Channel {
    /// A unitary gate, applied as a single Kraus operator.
    Unitary(Array2<Complex64>),
    /// A gate diagonal in the computational basis, represented by its
    /// eigenvalue vector alone.
    Diagonal(Array1<Complex64>),
    /// A general (possibly non-unitary) channel given by its Kraus
    /// decomposition.
    Kraus(Vec<Array2<Complex64>>),
}

impl Channel {
    /// Applies the channel to `device_wires` of `state`, mutating it in
    /// place.
    pub fn apply(&self, state: &mut DensityTensor, device_wires: &[usize]) {
        match self {
            Channel::Diagonal(eigvals) => apply_diagonal(state, eigvals, device_wires),
            Channel::Unitary(matrix) => {
                apply_kraus(state, std::slice::from_ref(matrix), device_wires);
            }
            Channel::Kraus(operators) => apply_kraus(state, operators, device_wires),
        }
    }
}

fn apply_kraus(state: &mut DensityTensor, operators: &[Array2<Complex64>], wires: &[usize]) {
    if wires.len() > TENSORDOT_WIRE_THRESHOLD {
        trace!("applying {}-wire channel via direct-axis contraction", wires.len());
        apply_channel_tensordot(state, operators, wires);
    } else {
        trace!("applying {}-wire channel via labeled contraction", wires.len());
        apply_channel_labeled(state, operators, wires);
    }
}

/// Stacks the Kraus operators into one tensor of shape
/// `[num_ops] ++ [2; 2k]`.
fn stack_kraus(operators: &[Array2<Complex64>], num_wires: usize) -> ArrayD<Complex64> {
    let mut data = Vec::with_capacity(operators.len() << (2 * num_wires));
    for op in operators {
        data.extend(op.iter().copied());
    }
    let mut shape = vec![operators.len()];
    shape.extend(std::iter::repeat(2).take(2 * num_wires));
    ArrayD::from_shape_vec(IxDyn(&shape), data).expect("kraus operators should be square")
}

/// General labeled contraction, the default for small wire counts.
///
/// Contracts the stacked Kraus tensor, the state, and the stacked
/// conjugate transpose in one pass over integer axis labels. The
/// Kraus-operator index gets a dedicated label summed over implicitly;
/// only the axes of the target wires are relabeled, all other axes pass
/// through unchanged.
pub(crate) fn apply_channel_labeled(
    state: &mut DensityTensor,
    operators: &[Array2<Complex64>],
    wires: &[usize],
) {
    let n = state.num_wires();
    let k = wires.len();
    let rho_dim = 2 * n;

    let kraus = stack_kraus(operators, k);
    let kraus_dag: Vec<Array2<Complex64>> =
        operators.iter().map(|op| op.t().mapv(|z| z.conj())).collect();
    let kraus_dag = stack_kraus(&kraus_dag, k);

    // Label arena: state axes keep their own indices, fresh labels are
    // drawn from past the state's rank.
    let new_rows: Vec<usize> = (rho_dim..rho_dim + k).collect();
    let new_cols: Vec<usize> = (rho_dim + k..rho_dim + 2 * k).collect();
    let kraus_sum = rho_dim + 2 * k;

    let mut kraus_labels = vec![kraus_sum];
    kraus_labels.extend(&new_rows);
    kraus_labels.extend(wires.iter().copied());

    let mut kraus_dag_labels = vec![kraus_sum];
    kraus_dag_labels.extend(wires.iter().map(|w| n + w));
    kraus_dag_labels.extend(&new_cols);

    let rho_labels: Vec<usize> = (0..rho_dim).collect();

    let mut output = rho_labels.clone();
    for (t, wire) in wires.iter().enumerate() {
        output[*wire] = new_rows[t];
        output[n + wire] = new_cols[t];
    }

    let result = labeled_contract(
        &[
            Labeled {
                tensor: &kraus,
                labels: kraus_labels,
            },
            Labeled {
                tensor: state.tensor(),
                labels: rho_labels,
            },
            Labeled {
                tensor: &kraus_dag,
                labels: kraus_dag_labels,
            },
        ],
        &output,
    );
    state.set_tensor(result);
}

/// Direct-axis contraction, used for larger wire counts.
///
/// Contracts each Kraus operator's input axes against the state's row
/// axes and the conjugate's axes against the column axes, sums the
/// per-operator results, then moves the produced axes back to their
/// original positions.
pub(crate) fn apply_channel_tensordot(
    state: &mut DensityTensor,
    operators: &[Array2<Complex64>],
    wires: &[usize],
) {
    let n = state.num_wires();
    let k = wires.len();
    let op_shape = vec![2; 2 * k];

    let row_axes = wires.to_vec();
    let col_axes: Vec<usize> = wires.iter().map(|w| n + w).collect();
    let op_col_axes: Vec<usize> = (k..2 * k).collect();

    let mut sum: Option<ArrayD<Complex64>> = None;
    for op in operators {
        let op = reshape(op.clone().into_dyn(), &op_shape);
        // After the first contraction the produced row axes sit in front,
        // so the column axes of the state keep their positions.
        let sandwiched = tensordot(&op, state.tensor(), &op_col_axes, &row_axes);
        let sandwiched = tensordot(&sandwiched, &conj(&op), &col_axes, &op_col_axes);
        sum = Some(match sum {
            None => sandwiched,
            Some(total) => total + sandwiched,
        });
    }
    let result = sum.expect("channel should have at least one Kraus operator");

    let rank = result.ndim();
    let mut source: Vec<usize> = (0..k).collect();
    source.extend(rank - k..rank);
    let mut dest = row_axes;
    dest.extend(col_axes);
    state.set_tensor(moveaxis(result, &source, &dest));
}

/// Diagonal fast path: the operator is diagonal in the computational
/// basis and is given by its eigenvalue vector. Rows and columns of the
/// target wires are scaled elementwise, all other axes are untouched.
pub(crate) fn apply_diagonal(state: &mut DensityTensor, eigvals: &Array1<Complex64>, wires: &[usize]) {
    trace!("applying {}-wire diagonal gate via fast path", wires.len());
    let n = state.num_wires();
    let k = wires.len();
    debug_assert_eq!(eigvals.len(), 1 << k);

    for (index, value) in state.tensor_mut().indexed_iter_mut() {
        let mut row_sub = 0;
        let mut col_sub = 0;
        for (t, wire) in wires.iter().enumerate() {
            row_sub |= index[*wire] << (k - 1 - t);
            col_sub |= index[n + wire] << (k - 1 - t);
        }
        *value *= eigvals[row_sub] * eigvals[col_sub].conj();
    }
}
