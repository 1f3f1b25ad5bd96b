// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A mixed-state qubit simulator.
//!
//! State is held as a density matrix in tensor form, so the simulator
//! supports noisy channels (arbitrary Kraus maps) alongside unitary
//! gates. [`device::MixedStateDevice`] owns a register of labeled
//! wires, applies circuits, and extracts analytic or sampled
//! measurement results.

pub mod channel;
pub mod contraction;
pub mod density_tensor;
pub mod device;
pub mod error;
pub mod gates;
pub mod measurement;
pub mod operation;
pub mod wires;

pub use channel::Channel;
pub use density_tensor::DensityTensor;
pub use device::{DeviceOptions, ExecutionConfig, MixedStateDevice, SnapshotKey, SnapshotRecorder};
pub use error::{Error, Result};
pub use gates::Gate;
pub use measurement::{Measurement, MeasurementValue, Observable};
pub use operation::{Circuit, Operation};
pub use wires::{WireLabel, WireMap, Wires, MAX_WIRES};
