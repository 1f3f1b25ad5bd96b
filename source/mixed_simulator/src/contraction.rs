// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Tensor contraction primitives for rank-2N density tensors.
//!
//! Contractions are expressed with integer axis indices rather than
//! single-character labels, so there is no ceiling on how many axes a
//! single contraction may touch.

use ndarray::{ArrayD, Ix2, IxDyn};
use num_complex::Complex64;

/// Reshapes `a` to `shape`, copying into standard layout first if a prior
/// permutation left the data non-contiguous.
pub fn reshape(a: ArrayD<Complex64>, shape: &[usize]) -> ArrayD<Complex64> {
    a.as_standard_layout()
        .into_owned()
        .into_shape(IxDyn(shape))
        .expect("element count should be preserved by reshape")
}

/// Contracts `axes_a` of `a` against `axes_b` of `b`, pairwise and in
/// order. The result carries the free axes of `a` followed by the free
/// axes of `b`, each group in its original order.
///
/// Implemented as permute / flatten / matrix-multiply / unflatten.
pub fn tensordot(
    a: &ArrayD<Complex64>,
    b: &ArrayD<Complex64>,
    axes_a: &[usize],
    axes_b: &[usize],
) -> ArrayD<Complex64> {
    debug_assert_eq!(axes_a.len(), axes_b.len());

    let free_a: Vec<usize> = (0..a.ndim()).filter(|ax| !axes_a.contains(ax)).collect();
    let free_b: Vec<usize> = (0..b.ndim()).filter(|ax| !axes_b.contains(ax)).collect();

    let mut perm_a = free_a.clone();
    perm_a.extend_from_slice(axes_a);
    let mut perm_b = axes_b.to_vec();
    perm_b.extend_from_slice(&free_b);

    let rows: usize = free_a.iter().map(|&ax| a.shape()[ax]).product();
    let inner: usize = axes_a.iter().map(|&ax| a.shape()[ax]).product();
    let cols: usize = free_b.iter().map(|&ax| b.shape()[ax]).product();

    let mut out_shape: Vec<usize> = free_a.iter().map(|&ax| a.shape()[ax]).collect();
    out_shape.extend(free_b.iter().map(|&ax| b.shape()[ax]));

    let lhs = reshape(a.clone().permuted_axes(IxDyn(&perm_a)), &[rows, inner])
        .into_dimensionality::<Ix2>()
        .expect("lhs should be two-dimensional");
    let rhs = reshape(b.clone().permuted_axes(IxDyn(&perm_b)), &[inner, cols])
        .into_dimensionality::<Ix2>()
        .expect("rhs should be two-dimensional");

    reshape(lhs.dot(&rhs).into_dyn(), &out_shape)
}

/// Moves the `source` axes of `a` to the `dest` positions, leaving the
/// relative order of all other axes unchanged.
pub fn moveaxis(a: ArrayD<Complex64>, source: &[usize], dest: &[usize]) -> ArrayD<Complex64> {
    debug_assert_eq!(source.len(), dest.len());
    let ndim = a.ndim();

    let mut order: Vec<usize> = (0..ndim).filter(|ax| !source.contains(ax)).collect();
    let mut pairs: Vec<(usize, usize)> = dest.iter().copied().zip(source.iter().copied()).collect();
    pairs.sort_unstable();
    for (d, s) in pairs {
        order.insert(d, s);
    }
    a.permuted_axes(IxDyn(&order))
}

/// One operand of a labeled contraction: a tensor together with one
/// integer label per axis.
pub struct Labeled<'a> {
    pub tensor: &'a ArrayD<Complex64>,
    pub labels: Vec<usize>,
}

/// Generalized contraction over integer axis labels.
///
/// Operands are reduced left to right; at each step the labels shared
/// between the accumulated tensor and the next operand, and needed by
/// neither a later operand nor the output, are summed over. Labels listed
/// in `output` select and order the surviving axes.
pub fn labeled_contract(operands: &[Labeled], output: &[usize]) -> ArrayD<Complex64> {
    let (first, rest) = operands
        .split_first()
        .expect("contraction needs at least one operand");
    let mut acc = first.tensor.clone();
    let mut acc_labels = first.labels.clone();

    for (i, operand) in rest.iter().enumerate() {
        let later = &rest[i + 1..];
        let contracted: Vec<usize> = acc_labels
            .iter()
            .copied()
            .filter(|label| {
                operand.labels.contains(label)
                    && !output.contains(label)
                    && !later.iter().any(|op| op.labels.contains(label))
            })
            .collect();

        let axes_acc: Vec<usize> = contracted
            .iter()
            .map(|label| position_of(&acc_labels, *label))
            .collect();
        let axes_op: Vec<usize> = contracted
            .iter()
            .map(|label| position_of(&operand.labels, *label))
            .collect();

        let free_acc: Vec<usize> = acc_labels
            .iter()
            .copied()
            .filter(|label| !contracted.contains(label))
            .collect();
        let free_op: Vec<usize> = operand
            .labels
            .iter()
            .copied()
            .filter(|label| !contracted.contains(label))
            .collect();

        acc = tensordot(&acc, operand.tensor, &axes_acc, &axes_op);
        acc_labels = free_acc;
        acc_labels.extend(free_op);
    }

    let perm: Vec<usize> = output
        .iter()
        .map(|label| position_of(&acc_labels, *label))
        .collect();
    acc.permuted_axes(IxDyn(&perm))
}

fn position_of(labels: &[usize], label: usize) -> usize {
    labels
        .iter()
        .position(|&l| l == label)
        .expect("label should be present on the operand")
}

/// Elementwise complex conjugate.
pub fn conj(a: &ArrayD<Complex64>) -> ArrayD<Complex64> {
    a.mapv(|z| z.conj())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn tensordot_matches_matrix_product() {
        let a = array![[c(1.0, 0.0), c(2.0, 0.0)], [c(3.0, 0.0), c(4.0, 0.0)]].into_dyn();
        let b = array![[c(0.0, 1.0), c(1.0, 0.0)], [c(1.0, 0.0), c(0.0, -1.0)]].into_dyn();
        let prod = tensordot(&a, &b, &[1], &[0]);
        assert_eq!(prod[[0, 0]], c(2.0, 1.0));
        assert_eq!(prod[[0, 1]], c(1.0, -2.0));
        assert_eq!(prod[[1, 0]], c(4.0, 3.0));
        assert_eq!(prod[[1, 1]], c(3.0, -4.0));
    }

    #[test]
    fn tensordot_full_contraction_gives_trace_like_sum() {
        let a = array![[c(1.0, 0.0), c(2.0, 0.0)], [c(3.0, 0.0), c(4.0, 0.0)]].into_dyn();
        let b = array![[c(1.0, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(1.0, 0.0)]].into_dyn();
        let s = tensordot(&a, &b, &[0, 1], &[0, 1]);
        assert_eq!(s.ndim(), 0);
        assert_eq!(s.sum(), c(5.0, 0.0));
    }

    #[test]
    fn moveaxis_permutes_shapes() {
        let a = ArrayD::<Complex64>::zeros(IxDyn(&[2, 3, 4, 5]));
        let moved = moveaxis(a, &[0, 3], &[3, 0]);
        assert_eq!(moved.shape(), &[5, 3, 4, 2]);
    }

    #[test]
    fn moveaxis_identity_is_noop() {
        let a = ArrayD::<Complex64>::zeros(IxDyn(&[2, 3]));
        let moved = moveaxis(a, &[0, 1], &[0, 1]);
        assert_eq!(moved.shape(), &[2, 3]);
    }

    #[test]
    fn labeled_contract_reproduces_sandwich_product() {
        // u . rho . u^T as a three-operand labeled contraction.
        let u = array![[c(0.0, 0.0), c(1.0, 0.0)], [c(1.0, 0.0), c(0.0, 0.0)]].into_dyn();
        let rho = array![[c(1.0, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(0.0, 0.0)]].into_dyn();
        let result = labeled_contract(
            &[
                Labeled {
                    tensor: &u,
                    labels: vec![10, 0],
                },
                Labeled {
                    tensor: &rho,
                    labels: vec![0, 1],
                },
                Labeled {
                    tensor: &u,
                    labels: vec![1, 11],
                },
            ],
            &[10, 11],
        );
        // X |0><0| X^T = |1><1|.
        assert_eq!(result[[0, 0]], c(0.0, 0.0));
        assert_eq!(result[[1, 1]], c(1.0, 0.0));
    }
}
