// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Built-in gate and noise-channel constructors.
//!
//! Gates diagonal in the computational basis carry their eigenvalue
//! vector so the device can take the diagonal fast path; everything else
//! carries a unitary matrix or a Kraus decomposition.

use crate::{
    channel::Channel,
    error::{Error, Result},
    wires::WireLabel,
};
use core::f64;
use ndarray::{Array1, Array2, array};
use num_complex::Complex64;
use std::sync::LazyLock;

/// A named operation bound to target wires, with its effect resolved to a
/// [`Channel`].
#[derive(Clone, Debug)]
pub struct Gate {
    pub name: &'static str,
    pub wires: Vec<WireLabel>,
    pub channel: Channel,
}

impl Gate {
    /// Whether the gate is diagonal in the computational basis.
    #[must_use]
    pub fn is_diagonal(&self) -> bool {
        matches!(self.channel, Channel::Diagonal(_))
    }

    /// Whether the gate is a non-unitary noise channel.
    #[must_use]
    pub fn is_channel(&self) -> bool {
        matches!(self.channel, Channel::Kraus(_))
    }
}

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

static X: LazyLock<Array2<Complex64>> = LazyLock::new(|| {
    array![[c(0., 0.), c(1., 0.)], [c(1., 0.), c(0., 0.)]]
});

static Y: LazyLock<Array2<Complex64>> = LazyLock::new(|| {
    array![[c(0., 0.), c(0., -1.)], [c(0., 1.), c(0., 0.)]]
});

static H: LazyLock<Array2<Complex64>> = LazyLock::new(|| {
    let f = 0.5_f64.sqrt();
    array![[c(f, 0.), c(f, 0.)], [c(f, 0.), c(-f, 0.)]]
});

static SX: LazyLock<Array2<Complex64>> = LazyLock::new(|| {
    let i = Complex64::i();
    array![
        [(1. + i) / 2., (1. - i) / 2.],
        [(1. - i) / 2., (1. + i) / 2.]
    ]
});

static CX: LazyLock<Array2<Complex64>> = LazyLock::new(|| {
    array![
        [c(1., 0.), c(0., 0.), c(0., 0.), c(0., 0.)],
        [c(0., 0.), c(1., 0.), c(0., 0.), c(0., 0.)],
        [c(0., 0.), c(0., 0.), c(0., 0.), c(1., 0.)],
        [c(0., 0.), c(0., 0.), c(1., 0.), c(0., 0.)]
    ]
});

static CY: LazyLock<Array2<Complex64>> = LazyLock::new(|| {
    array![
        [c(1., 0.), c(0., 0.), c(0., 0.), c(0., 0.)],
        [c(0., 0.), c(1., 0.), c(0., 0.), c(0., 0.)],
        [c(0., 0.), c(0., 0.), c(0., 0.), c(0., -1.)],
        [c(0., 0.), c(0., 0.), c(0., 1.), c(0., 0.)]
    ]
});

static SWAP: LazyLock<Array2<Complex64>> = LazyLock::new(|| {
    array![
        [c(1., 0.), c(0., 0.), c(0., 0.), c(0., 0.)],
        [c(0., 0.), c(0., 0.), c(1., 0.), c(0., 0.)],
        [c(0., 0.), c(1., 0.), c(0., 0.), c(0., 0.)],
        [c(0., 0.), c(0., 0.), c(0., 0.), c(1., 0.)]
    ]
});

static TOFFOLI: LazyLock<Array2<Complex64>> = LazyLock::new(|| {
    let mut m = Array2::<Complex64>::eye(8);
    m[[6, 6]] = c(0., 0.);
    m[[7, 7]] = c(0., 0.);
    m[[6, 7]] = c(1., 0.);
    m[[7, 6]] = c(1., 0.);
    m
});

fn unitary(name: &'static str, matrix: Array2<Complex64>, wires: Vec<WireLabel>) -> Gate {
    Gate {
        name,
        wires,
        channel: Channel::Unitary(matrix),
    }
}

fn diagonal(name: &'static str, eigvals: Array1<Complex64>, wires: Vec<WireLabel>) -> Gate {
    Gate {
        name,
        wires,
        channel: Channel::Diagonal(eigvals),
    }
}

fn kraus(name: &'static str, operators: Vec<Array2<Complex64>>, wires: Vec<WireLabel>) -> Gate {
    Gate {
        name,
        wires,
        channel: Channel::Kraus(operators),
    }
}

pub fn x(wire: impl Into<WireLabel>) -> Gate {
    unitary("PauliX", X.clone(), vec![wire.into()])
}

pub fn y(wire: impl Into<WireLabel>) -> Gate {
    unitary("PauliY", Y.clone(), vec![wire.into()])
}

pub fn z(wire: impl Into<WireLabel>) -> Gate {
    diagonal("PauliZ", array![c(1., 0.), c(-1., 0.)], vec![wire.into()])
}

pub fn h(wire: impl Into<WireLabel>) -> Gate {
    unitary("Hadamard", H.clone(), vec![wire.into()])
}

pub fn s(wire: impl Into<WireLabel>) -> Gate {
    diagonal("S", array![c(1., 0.), c(0., 1.)], vec![wire.into()])
}

pub fn s_adj(wire: impl Into<WireLabel>) -> Gate {
    diagonal("S†", array![c(1., 0.), c(0., -1.)], vec![wire.into()])
}

pub fn t(wire: impl Into<WireLabel>) -> Gate {
    let phase = (Complex64::i() * f64::consts::FRAC_PI_4).exp();
    diagonal("T", array![c(1., 0.), phase], vec![wire.into()])
}

pub fn t_adj(wire: impl Into<WireLabel>) -> Gate {
    let phase = (-Complex64::i() * f64::consts::FRAC_PI_4).exp();
    diagonal("T†", array![c(1., 0.), phase], vec![wire.into()])
}

pub fn sx(wire: impl Into<WireLabel>) -> Gate {
    unitary("SX", SX.clone(), vec![wire.into()])
}

pub fn rx(angle: f64, wire: impl Into<WireLabel>) -> Gate {
    let sin = (angle / 2.0).sin();
    let cos = (angle / 2.0).cos();
    let i = Complex64::i();
    let m = array![[c(cos, 0.), -i * sin], [-i * sin, c(cos, 0.)]];
    unitary("RX", m, vec![wire.into()])
}

pub fn ry(angle: f64, wire: impl Into<WireLabel>) -> Gate {
    let sin = (angle / 2.0).sin();
    let cos = (angle / 2.0).cos();
    let m = array![[c(cos, 0.), c(-sin, 0.)], [c(sin, 0.), c(cos, 0.)]];
    unitary("RY", m, vec![wire.into()])
}

pub fn rz(angle: f64, wire: impl Into<WireLabel>) -> Gate {
    let i = Complex64::i();
    let eigvals = array![(-i * angle / 2.0).exp(), (i * angle / 2.0).exp()];
    diagonal("RZ", eigvals, vec![wire.into()])
}

pub fn phase_shift(angle: f64, wire: impl Into<WireLabel>) -> Gate {
    let eigvals = array![c(1., 0.), (Complex64::i() * angle).exp()];
    diagonal("PhaseShift", eigvals, vec![wire.into()])
}

pub fn cx(control: impl Into<WireLabel>, target: impl Into<WireLabel>) -> Gate {
    unitary("CNOT", CX.clone(), vec![control.into(), target.into()])
}

pub fn cy(control: impl Into<WireLabel>, target: impl Into<WireLabel>) -> Gate {
    unitary("CY", CY.clone(), vec![control.into(), target.into()])
}

pub fn cz(control: impl Into<WireLabel>, target: impl Into<WireLabel>) -> Gate {
    diagonal(
        "CZ",
        array![c(1., 0.), c(1., 0.), c(1., 0.), c(-1., 0.)],
        vec![control.into(), target.into()],
    )
}

pub fn swap(wire0: impl Into<WireLabel>, wire1: impl Into<WireLabel>) -> Gate {
    unitary("SWAP", SWAP.clone(), vec![wire0.into(), wire1.into()])
}

pub fn rzz(angle: f64, wire0: impl Into<WireLabel>, wire1: impl Into<WireLabel>) -> Gate {
    let i = Complex64::i();
    let a = (-i * angle / 2.0).exp();
    let b = (i * angle / 2.0).exp();
    diagonal("RZZ", array![a, b, b, a], vec![wire0.into(), wire1.into()])
}

pub fn toffoli(
    control0: impl Into<WireLabel>,
    control1: impl Into<WireLabel>,
    target: impl Into<WireLabel>,
) -> Gate {
    unitary(
        "Toffoli",
        TOFFOLI.clone(),
        vec![control0.into(), control1.into(), target.into()],
    )
}

pub fn ccz(
    control0: impl Into<WireLabel>,
    control1: impl Into<WireLabel>,
    target: impl Into<WireLabel>,
) -> Gate {
    let mut eigvals = Array1::from_elem(8, c(1., 0.));
    eigvals[7] = c(-1., 0.);
    diagonal(
        "CCZ",
        eigvals,
        vec![control0.into(), control1.into(), target.into()],
    )
}

/// An arbitrary unitary matrix on the given wires.
pub fn qubit_unitary(matrix: Array2<Complex64>, wires: Vec<WireLabel>) -> Result<Gate> {
    let dim = 1 << wires.len();
    if matrix.shape() != [dim, dim] {
        return Err(Error::OperatorSize("QubitUnitary"));
    }
    Ok(unitary("QubitUnitary", matrix, wires))
}

/// An arbitrary gate diagonal in the computational basis, given by its
/// eigenvalue vector.
pub fn diagonal_unitary(eigvals: Array1<Complex64>, wires: Vec<WireLabel>) -> Result<Gate> {
    if eigvals.len() != 1 << wires.len() {
        return Err(Error::OperatorSize("DiagonalQubitUnitary"));
    }
    Ok(diagonal("DiagonalQubitUnitary", eigvals, wires))
}

/// An arbitrary channel given by its Kraus decomposition.
pub fn qubit_channel(operators: Vec<Array2<Complex64>>, wires: Vec<WireLabel>) -> Gate {
    kraus("QubitChannel", operators, wires)
}

fn check_probability(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidProbability { name, value })
    }
}

/// Bit-flip channel: applies `X` with probability `p`. Also used by the
/// device to model classical readout error.
pub fn bit_flip(p: f64, wire: impl Into<WireLabel>) -> Result<Gate> {
    check_probability("BitFlip", p)?;
    let k0 = Array2::eye(2) * c((1.0 - p).sqrt(), 0.);
    let k1 = X.clone() * c(p.sqrt(), 0.);
    Ok(kraus("BitFlip", vec![k0, k1], vec![wire.into()]))
}

/// Phase-flip channel: applies `Z` with probability `p`.
pub fn phase_flip(p: f64, wire: impl Into<WireLabel>) -> Result<Gate> {
    check_probability("PhaseFlip", p)?;
    let k0 = Array2::eye(2) * c((1.0 - p).sqrt(), 0.);
    let k1 = array![[c(1., 0.), c(0., 0.)], [c(0., 0.), c(-1., 0.)]] * c(p.sqrt(), 0.);
    Ok(kraus("PhaseFlip", vec![k0, k1], vec![wire.into()]))
}

/// Symmetric depolarizing channel with error probability `p`, split
/// evenly between X, Y and Z errors.
pub fn depolarizing(p: f64, wire: impl Into<WireLabel>) -> Result<Gate> {
    check_probability("DepolarizingChannel", p)?;
    let k0 = Array2::eye(2) * c((1.0 - p).sqrt(), 0.);
    let w = c((p / 3.0).sqrt(), 0.);
    let kx = X.clone() * w;
    let ky = Y.clone() * w;
    let kz = array![[c(1., 0.), c(0., 0.)], [c(0., 0.), c(-1., 0.)]] * w;
    Ok(kraus(
        "DepolarizingChannel",
        vec![k0, kx, ky, kz],
        vec![wire.into()],
    ))
}

/// Amplitude damping with decay probability `gamma`.
pub fn amplitude_damping(gamma: f64, wire: impl Into<WireLabel>) -> Result<Gate> {
    check_probability("AmplitudeDamping", gamma)?;
    let k0 = array![[c(1., 0.), c(0., 0.)], [c(0., 0.), c((1.0 - gamma).sqrt(), 0.)]];
    let k1 = array![[c(0., 0.), c(gamma.sqrt(), 0.)], [c(0., 0.), c(0., 0.)]];
    Ok(kraus("AmplitudeDamping", vec![k0, k1], vec![wire.into()]))
}

/// Amplitude damping towards a thermal state: decay with probability
/// `gamma`, excitation branch weighted by `1 - p`.
pub fn generalized_amplitude_damping(
    gamma: f64,
    p: f64,
    wire: impl Into<WireLabel>,
) -> Result<Gate> {
    check_probability("GeneralizedAmplitudeDamping", gamma)?;
    check_probability("GeneralizedAmplitudeDamping", p)?;
    let sp = c(p.sqrt(), 0.);
    let sq = c((1.0 - p).sqrt(), 0.);
    let k0 = array![[c(1., 0.), c(0., 0.)], [c(0., 0.), c((1.0 - gamma).sqrt(), 0.)]] * sp;
    let k1 = array![[c(0., 0.), c(gamma.sqrt(), 0.)], [c(0., 0.), c(0., 0.)]] * sp;
    let k2 = array![[c((1.0 - gamma).sqrt(), 0.), c(0., 0.)], [c(0., 0.), c(1., 0.)]] * sq;
    let k3 = array![[c(0., 0.), c(0., 0.)], [c(gamma.sqrt(), 0.), c(0., 0.)]] * sq;
    Ok(kraus(
        "GeneralizedAmplitudeDamping",
        vec![k0, k1, k2, k3],
        vec![wire.into()],
    ))
}

/// Phase damping with scattering probability `gamma`.
pub fn phase_damping(gamma: f64, wire: impl Into<WireLabel>) -> Result<Gate> {
    check_probability("PhaseDamping", gamma)?;
    let k0 = array![[c(1., 0.), c(0., 0.)], [c(0., 0.), c((1.0 - gamma).sqrt(), 0.)]];
    let k1 = array![[c(0., 0.), c(0., 0.)], [c(0., 0.), c(gamma.sqrt(), 0.)]];
    Ok(kraus("PhaseDamping", vec![k0, k1], vec![wire.into()]))
}

/// Reset error: with probability `p0` the qubit is reset to `|0⟩`, with
/// probability `p1` to `|1⟩`.
pub fn reset_error(p0: f64, p1: f64, wire: impl Into<WireLabel>) -> Result<Gate> {
    check_probability("ResetError", p0)?;
    check_probability("ResetError", p1)?;
    check_probability("ResetError", p0 + p1)?;
    let k0 = Array2::eye(2) * c((1.0 - p0 - p1).sqrt(), 0.);
    let s0 = c(p0.sqrt(), 0.);
    let s1 = c(p1.sqrt(), 0.);
    let k1 = array![[c(1., 0.), c(0., 0.)], [c(0., 0.), c(0., 0.)]] * s0;
    let k2 = array![[c(0., 0.), c(1., 0.)], [c(0., 0.), c(0., 0.)]] * s0;
    let k3 = array![[c(0., 0.), c(0., 0.)], [c(1., 0.), c(0., 0.)]] * s1;
    let k4 = array![[c(0., 0.), c(0., 0.)], [c(0., 0.), c(1., 0.)]] * s1;
    Ok(kraus(
        "ResetError",
        vec![k0, k1, k2, k3, k4],
        vec![wire.into()],
    ))
}
