// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The circuit representation consumed by the device: an ordered tape of
//! operations plus the requested measurement processes.
//!
//! Operations arrive already decomposed and validated by the caller; the
//! device performs structural and numeric checks only.

use crate::{
    gates::Gate,
    measurement::Measurement,
    wires::WireLabel,
};
use ndarray::Array2;
use num_complex::Complex64;

/// One entry of the operation tape.
#[derive(Clone, Debug)]
pub enum Operation {
    /// No-op.
    Identity,
    /// Prepare a computational basis state on the given wires. Only valid
    /// as the first operation of a tape.
    BasisState { bits: Vec<u8>, wires: Vec<WireLabel> },
    /// Prepare a pure state from a normalized state vector. Only valid as
    /// the first operation of a tape.
    StatePrep {
        state: Vec<Complex64>,
        wires: Vec<WireLabel>,
    },
    /// Prepare a mixed state on the given wires. Only valid as the first
    /// operation of a tape.
    QubitDensityMatrix {
        matrix: Array2<Complex64>,
        wires: Vec<WireLabel>,
    },
    /// Record a mid-circuit measurement without disturbing the state.
    /// A no-op unless a snapshot recorder is attached.
    Snapshot {
        tag: Option<String>,
        measurement: Measurement,
    },
    /// A gate or noise channel.
    Gate(Gate),
}

impl Operation {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Operation::Identity => "Identity",
            Operation::BasisState { .. } => "BasisState",
            Operation::StatePrep { .. } => "StatePrep",
            Operation::QubitDensityMatrix { .. } => "QubitDensityMatrix",
            Operation::Snapshot { .. } => "Snapshot",
            Operation::Gate(gate) => gate.name,
        }
    }

    /// State-preparation operations replace the tensor wholesale and may
    /// only appear at the start of a tape.
    #[must_use]
    pub fn is_state_prep(&self) -> bool {
        matches!(
            self,
            Operation::BasisState { .. }
                | Operation::StatePrep { .. }
                | Operation::QubitDensityMatrix { .. }
        )
    }
}

impl From<Gate> for Operation {
    fn from(gate: Gate) -> Self {
        Operation::Gate(gate)
    }
}

/// An ordered tape of operations with the measurements to extract at the
/// end.
#[derive(Clone, Debug, Default)]
pub struct Circuit {
    pub operations: Vec<Operation>,
    pub measurements: Vec<Measurement>,
}

impl Circuit {
    #[must_use]
    pub fn new(
        operations: Vec<Operation>,
        measurements: Vec<Measurement>,
    ) -> Self {
        Self {
            operations,
            measurements,
        }
    }
}
