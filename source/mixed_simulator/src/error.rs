// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;

/// Errors surfaced by the mixed-state device.
///
/// All errors are synchronous and non-retryable; a failed operation leaves
/// the device state as the last successful operation left it.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    #[error("this device does not support computations on more than 23 wires, got {0}")]
    TooManyWires(usize),

    #[error("wire labels must be unique, label {0} appears more than once")]
    DuplicateWire(String),

    #[error("wire {0} is not present on the device")]
    UnknownWire(String),

    #[error("the readout error probability should be a number in the range [0, 1], got {0}")]
    ReadoutProbability(f64),

    #[error("basis state parameter must consist of 0 or 1 integers")]
    BasisStateBits,

    #[error("basis state parameter and wires must be of equal length")]
    BasisStateLength,

    #[error("state vector must be of length 2**wires")]
    StateVectorSize,

    #[error("sum of amplitudes-squared does not equal one")]
    StateVectorNorm,

    #[error("density matrix must be of shape (2**wires, 2**wires)")]
    DensityMatrixSize,

    #[error("trace of density matrix is not equal one")]
    DensityMatrixTrace,

    #[error("operation {0} cannot be used after other operations have already been applied")]
    StatePrepOrdering(String),

    #[error("snapshots of {0} measurements are not supported on the mixed-state device")]
    UnsupportedSnapshot(String),

    #[error("device option {0} is not present on the mixed-state device")]
    UnsupportedDeviceOption(String),

    #[error("{name} requires a probability in the range [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },

    #[error("{0} operator size does not match the number of target wires")]
    OperatorSize(&'static str),

    #[error("{0} measurements require a finite shot count")]
    ShotsRequired(&'static str),

    #[error("subsystems for computing mutual information must not overlap")]
    OverlappingSubsystems,
}

pub type Result<T> = std::result::Result<T, Error>;
