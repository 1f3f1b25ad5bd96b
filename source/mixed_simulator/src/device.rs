// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The mixed-state qubit device: operation dispatch, execution
//! orchestration, and measurement extraction.


use crate::{
    density_tensor::DensityTensor,
    error::{Error, Result},
    gates::{self, Gate},
    measurement::{Measurement, MeasurementValue, Observable, purity_of, vn_entropy_of},
    operation::{Circuit, Operation},
    wires::{WireLabel, WireMap, Wires},
};
use log::{debug, trace};
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rustc_hash::FxHashMap;

/// Construction parameters beyond the wire register.
#[derive(Clone, Debug, Default)]
pub struct DeviceOptions {
    /// Number of samples per sampled measurement; `None` selects exact
    /// analytic mode.
    pub shots: Option<usize>,
    /// Probability of classical bit-flip readout error, applied to the
    /// measured wires after all rotations.
    pub readout_prob: Option<f64>,
    /// Seed of the per-device pseudo-random generator.
    pub seed: u64,
}

/// Per-execution configuration. Unknown option names are rejected.
#[derive(Clone, Debug, Default)]
pub struct ExecutionConfig {
    pub device_options: FxHashMap<String, u64>,
}

const DEVICE_OPTIONS: &[&str] = &["seed"];

/// Key of a recorded snapshot: the explicit tag when one was given,
/// otherwise an auto-incrementing index.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum SnapshotKey {
    Tag(String),
    Index(usize),
}

/// Collects mid-circuit snapshot results. Snapshot operations are
/// complete no-ops unless a recorder is attached and active.
#[derive(Clone, Debug, Default)]
pub struct SnapshotRecorder {
    pub active: bool,
    snapshots: Vec<(SnapshotKey, MeasurementValue)>,
}

impl SnapshotRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: true,
            snapshots: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    fn record(&mut self, key: SnapshotKey, value: MeasurementValue) {
        self.snapshots.push((key, value));
    }

    #[must_use]
    pub fn get(&self, key: &SnapshotKey) -> Option<&MeasurementValue> {
        self.snapshots
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn snapshots(&self) -> &[(SnapshotKey, MeasurementValue)] {
        &self.snapshots
    }
}

/// A qubit device for mixed-state computations.
///
/// The device owns a single [`DensityTensor`] mutated in place by every
/// operation, plus a pre-rotation reference captured after the main tape
/// so state queries and state-type measurements see the physical state
/// rather than the measurement-basis-rotated one.
#[derive(Debug)]
pub struct MixedStateDevice {
    wire_map: WireMap,
    shots: Option<usize>,
    readout_prob: Option<f64>,
    state: DensityTensor,
    pre_rotated: DensityTensor,
    /// Device wires subject to readout error for the current execution.
    measured_wires: Vec<usize>,
    rng: StdRng,
    recorder: Option<SnapshotRecorder>,
}

impl MixedStateDevice {
    pub fn new(wires: impl Into<Wires>, options: DeviceOptions) -> Result<Self> {
        let wire_map = WireMap::new(wires)?;
        if let Some(p) = options.readout_prob {
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(Error::ReadoutProbability(p));
            }
        }
        let state = DensityTensor::new(wire_map.len())?;
        let pre_rotated = state.clone();
        debug!("created mixed-state device with {} wires", wire_map.len());
        Ok(Self {
            wire_map,
            shots: options.shots,
            readout_prob: options.readout_prob,
            state,
            pre_rotated,
            measured_wires: Vec::new(),
            rng: StdRng::seed_from_u64(options.seed),
            recorder: None,
        })
    }

    #[must_use]
    pub fn num_wires(&self) -> usize {
        self.wire_map.len()
    }

    #[must_use]
    pub fn wires(&self) -> &[WireLabel] {
        self.wire_map.labels()
    }

    pub fn attach_recorder(&mut self, recorder: SnapshotRecorder) {
        self.recorder = Some(recorder);
    }

    pub fn take_recorder(&mut self) -> Option<SnapshotRecorder> {
        self.recorder.take()
    }

    /// Returns the device to the `|0…0⟩⟨0…0|` basis state.
    pub fn reset(&mut self) {
        debug!("resetting device state");
        self.state.reset();
        self.pre_rotated = self.state.clone();
        self.measured_wires.clear();
    }

    /// The full pre-rotation density matrix.
    #[must_use]
    pub fn state(&self) -> Array2<Complex64> {
        self.pre_rotated.as_matrix()
    }

    /// The reduced pre-rotation density matrix over the given wires.
    pub fn density_matrix(&self, wires: &[WireLabel]) -> Result<Array2<Complex64>> {
        let device_wires = self.wire_map.map_wires(wires)?;
        Ok(self.pre_rotated.partial_trace(&device_wires))
    }

    /// Computational-basis probabilities of the working state over the
    /// given wires, marginalized over all others. Empty means all wires.
    pub fn analytic_probability(&self, wires: &[WireLabel]) -> Result<Array1<f64>> {
        let device_wires = self.map_or_all(wires)?;
        Ok(self.probabilities_of(&self.state, &device_wires))
    }

    pub fn purity(&self, wires: &[WireLabel]) -> Result<f64> {
        let device_wires = self.wire_map.map_wires(wires)?;
        Ok(purity_of(&self.pre_rotated.partial_trace(&device_wires)))
    }

    pub fn vn_entropy(&self, wires: &[WireLabel], log_base: Option<f64>) -> Result<f64> {
        let device_wires = self.wire_map.map_wires(wires)?;
        Ok(vn_entropy_of(
            &self.pre_rotated.partial_trace(&device_wires),
            log_base,
        ))
    }

    /// `I(A:B) = S(A) + S(B) - S(AB)` from the pre-rotation state. The
    /// two subsystems must be disjoint.
    pub fn mutual_info(
        &self,
        wires0: &[WireLabel],
        wires1: &[WireLabel],
        log_base: Option<f64>,
    ) -> Result<f64> {
        let a = self.wire_map.map_wires(wires0)?;
        let b = self.wire_map.map_wires(wires1)?;
        Self::mutual_info_of(&self.pre_rotated, &a, &b, log_base)
    }

    fn mutual_info_of(
        state: &DensityTensor,
        a: &[usize],
        b: &[usize],
        log_base: Option<f64>,
    ) -> Result<f64> {
        if a.iter().any(|wire| b.contains(wire)) {
            return Err(Error::OverlappingSubsystems);
        }
        let mut joint = a.to_vec();
        joint.extend_from_slice(b);

        let s_a = vn_entropy_of(&state.partial_trace(a), log_base);
        let s_b = vn_entropy_of(&state.partial_trace(b), log_base);
        let s_ab = vn_entropy_of(&state.partial_trace(&joint), log_base);
        Ok(s_a + s_b - s_ab)
    }

    /// Executes a circuit and returns one result per requested
    /// measurement, in request order.
    pub fn execute(&mut self, circuit: &Circuit) -> Result<Vec<MeasurementValue>> {
        debug!(
            "executing circuit: {} operations, {} measurements",
            circuit.operations.len(),
            circuit.measurements.len()
        );
        self.measured_wires = self.compute_measured_wires(&circuit.measurements)?;

        let rotations: Vec<Gate> = circuit
            .measurements
            .iter()
            .filter_map(Measurement::observable)
            .flat_map(|observable| observable.diagonalizing_gates.clone())
            .collect();
        self.apply(&circuit.operations, &rotations)?;

        circuit
            .measurements
            .iter()
            .map(|measurement| self.measure(measurement))
            .collect()
    }

    /// Executes under a per-execution configuration; unknown device
    /// options fail before any state is touched.
    pub fn execute_with_config(
        &mut self,
        circuit: &Circuit,
        config: &ExecutionConfig,
    ) -> Result<Vec<MeasurementValue>> {
        for option in config.device_options.keys() {
            if !DEVICE_OPTIONS.contains(&option.as_str()) {
                return Err(Error::UnsupportedDeviceOption(option.clone()));
            }
        }
        if let Some(seed) = config.device_options.get("seed") {
            self.rng = StdRng::seed_from_u64(*seed);
        }
        self.execute(circuit)
    }

    /// Applies the main tape, captures the pre-rotation state, applies
    /// the measurement-basis rotations, then injects readout error on the
    /// measured wires.
    pub fn apply(&mut self, operations: &[Operation], rotations: &[Gate]) -> Result<()> {
        for (i, operation) in operations.iter().enumerate() {
            if i > 0 && operation.is_state_prep() {
                return Err(Error::StatePrepOrdering(operation.name().to_string()));
            }
        }

        for operation in operations {
            self.apply_operation(operation)?;
        }

        self.pre_rotated = self.state.clone();

        for gate in rotations {
            self.apply_gate(gate)?;
        }

        if let Some(p) = self.readout_prob {
            for wire in self.measured_wires.clone() {
                let label = self.wire_map.labels()[wire].clone();
                let flip = gates::bit_flip(p, label)?;
                self.apply_gate(&flip)?;
            }
        }
        Ok(())
    }

    fn apply_operation(&mut self, operation: &Operation) -> Result<()> {
        match operation {
            Operation::Identity => Ok(()),
            Operation::BasisState { bits, wires } => {
                let device_wires = self.wire_map.map_wires(wires)?;
                self.state.set_basis_state(bits, &device_wires)
            }
            Operation::StatePrep { state, wires } => {
                let device_wires = self.wire_map.map_wires(wires)?;
                self.state.set_state_vector(state, &device_wires)
            }
            Operation::QubitDensityMatrix { matrix, wires } => {
                let device_wires = self.wire_map.map_wires(wires)?;
                self.state.set_density_matrix(matrix, &device_wires)
            }
            Operation::Snapshot { tag, measurement } => self.apply_snapshot(tag, measurement),
            Operation::Gate(gate) => self.apply_gate(gate),
        }
    }

    fn apply_gate(&mut self, gate: &Gate) -> Result<()> {
        let device_wires = self.wire_map.map_wires(&gate.wires)?;
        trace!("applying {} to device wires {device_wires:?}", gate.name);
        gate.channel.apply(&mut self.state, &device_wires);
        Ok(())
    }

    fn apply_snapshot(&mut self, tag: &Option<String>, measurement: &Measurement) -> Result<()> {
        if !self.recorder.as_ref().is_some_and(|r| r.active) {
            return Ok(());
        }
        let value = self.snapshot_measurement(measurement)?;
        let recorder = self.recorder.as_mut().expect("recorder should be attached");
        let key = match tag {
            Some(tag) => SnapshotKey::Tag(tag.clone()),
            None => SnapshotKey::Index(recorder.len()),
        };
        recorder.record(key, value);
        Ok(())
    }

    /// Measures the current mid-circuit state. Measurement kinds needing
    /// a diagonalizing basis rotate a disposable working copy; the stored
    /// tensor is never touched.
    fn snapshot_measurement(&self, measurement: &Measurement) -> Result<MeasurementValue> {
        match measurement {
            Measurement::State => Ok(MeasurementValue::Matrix(self.state.as_matrix())),
            Measurement::DensityMatrix { wires } => {
                let device_wires = self.wire_map.map_wires(wires)?;
                Ok(MeasurementValue::Matrix(
                    self.state.partial_trace(&device_wires),
                ))
            }
            Measurement::Purity { wires } => {
                let device_wires = self.wire_map.map_wires(wires)?;
                Ok(MeasurementValue::Scalar(purity_of(
                    &self.state.partial_trace(&device_wires),
                )))
            }
            Measurement::VnEntropy { wires, log_base } => {
                let device_wires = self.wire_map.map_wires(wires)?;
                Ok(MeasurementValue::Scalar(vn_entropy_of(
                    &self.state.partial_trace(&device_wires),
                    *log_base,
                )))
            }
            Measurement::MutualInfo {
                wires0,
                wires1,
                log_base,
            } => {
                let a = self.wire_map.map_wires(wires0)?;
                let b = self.wire_map.map_wires(wires1)?;
                Ok(MeasurementValue::Scalar(Self::mutual_info_of(
                    &self.state,
                    &a,
                    &b,
                    *log_base,
                )?))
            }
            Measurement::Probability { wires } => {
                let device_wires = self.map_or_all(wires)?;
                Ok(MeasurementValue::Probabilities(
                    self.probabilities_of(&self.state, &device_wires),
                ))
            }
            Measurement::Expectation { observable } => {
                let probs = self.rotated_probabilities(observable)?;
                Ok(MeasurementValue::Scalar(dot(&probs, &observable.eigvals)))
            }
            Measurement::Variance { observable } => {
                let probs = self.rotated_probabilities(observable)?;
                Ok(MeasurementValue::Scalar(variance(
                    &probs,
                    &observable.eigvals,
                )))
            }
            Measurement::Sample { .. } | Measurement::Counts { .. } => {
                Err(Error::UnsupportedSnapshot(measurement.kind_name().to_string()))
            }
        }
    }

    /// Probabilities in the observable's eigenbasis, computed on a
    /// disposable copy of the working state.
    fn rotated_probabilities(&self, observable: &Observable) -> Result<Array1<f64>> {
        let mut working = self.state.clone();
        for gate in &observable.diagonalizing_gates {
            let device_wires = self.wire_map.map_wires(&gate.wires)?;
            gate.channel.apply(&mut working, &device_wires);
        }
        let device_wires = self.wire_map.map_wires(&observable.wires)?;
        Ok(self.probabilities_of(&working, &device_wires))
    }

    /// Readout-error wire set for one execution. State-type measurements
    /// disable readout error outright; full-register sample measurements
    /// enable it everywhere; entropy measurements contribute nothing.
    fn compute_measured_wires(&self, measurements: &[Measurement]) -> Result<Vec<usize>> {
        if self.readout_prob.is_none() {
            return Ok(Vec::new());
        }

        let mut union: Vec<usize> = Vec::new();
        for measurement in measurements {
            if measurement.is_state_type() {
                return Ok(Vec::new());
            }
            if matches!(
                measurement,
                Measurement::Sample { .. } | Measurement::Counts { .. }
            ) {
                let wires = measurement.wires();
                if wires.is_empty() || wires.len() == self.num_wires() {
                    return Ok((0..self.num_wires()).collect());
                }
            }
            if measurement.is_entropy_type() {
                continue;
            }
            for wire in self.wire_map.map_wires(&measurement.wires())? {
                if !union.contains(&wire) {
                    union.push(wire);
                }
            }
        }
        Ok(union)
    }

    fn measure(&mut self, measurement: &Measurement) -> Result<MeasurementValue> {
        match measurement {
            Measurement::State => Ok(MeasurementValue::Matrix(self.state())),
            Measurement::DensityMatrix { wires } => {
                Ok(MeasurementValue::Matrix(self.density_matrix(wires)?))
            }
            Measurement::Probability { wires } => Ok(MeasurementValue::Probabilities(
                self.analytic_probability(wires)?,
            )),
            Measurement::Expectation { observable } => {
                let probs = self.analytic_probability(&observable.wires)?;
                Ok(MeasurementValue::Scalar(dot(&probs, &observable.eigvals)))
            }
            Measurement::Variance { observable } => {
                let probs = self.analytic_probability(&observable.wires)?;
                Ok(MeasurementValue::Scalar(variance(
                    &probs,
                    &observable.eigvals,
                )))
            }
            Measurement::Purity { wires } => Ok(MeasurementValue::Scalar(self.purity(wires)?)),
            Measurement::VnEntropy { wires, log_base } => {
                Ok(MeasurementValue::Scalar(self.vn_entropy(wires, *log_base)?))
            }
            Measurement::MutualInfo {
                wires0,
                wires1,
                log_base,
            } => Ok(MeasurementValue::Scalar(self.mutual_info(
                wires0,
                wires1,
                *log_base,
            )?)),
            Measurement::Sample { wires } => Ok(MeasurementValue::Samples(
                self.generate_samples(wires, measurement.kind_name())?,
            )),
            Measurement::Counts { wires } => {
                let samples = self.generate_samples(wires, measurement.kind_name())?;
                let mut counts: FxHashMap<String, usize> = FxHashMap::default();
                for row in samples {
                    let key: String = row.iter().map(ToString::to_string).collect();
                    *counts.entry(key).or_insert(0) += 1;
                }
                Ok(MeasurementValue::Counts(counts))
            }
        }
    }

    /// Draws `shots` computational-basis samples over the given wires
    /// from the working state's analytic distribution. `kind` names the
    /// requesting measurement in the shots-required error.
    fn generate_samples(&mut self, wires: &[WireLabel], kind: &'static str) -> Result<Vec<Vec<u8>>> {
        let shots = self.shots.ok_or(Error::ShotsRequired(kind))?;
        let device_wires = self.map_or_all(wires)?;
        let probs = self.probabilities_of(&self.state, &device_wires);

        let width = device_wires.len();
        let mut samples = Vec::with_capacity(shots);
        for _ in 0..shots {
            let r: f64 = self.rng.gen_range(0.0..1.0);
            let mut acc = 0.0;
            let mut drawn = probs.len() - 1;
            for (index, p) in probs.iter().enumerate() {
                acc += p;
                if r < acc {
                    drawn = index;
                    break;
                }
            }
            samples.push(
                (0..width)
                    .map(|t| u8::try_from((drawn >> (width - 1 - t)) & 1).expect("bit fits in u8"))
                    .collect(),
            );
        }
        Ok(samples)
    }

    /// Diagonal probabilities of `state` marginalized onto
    /// `device_wires`, real part taken and floating-point negatives
    /// reflected to their absolute value.
    fn probabilities_of(&self, state: &DensityTensor, device_wires: &[usize]) -> Array1<f64> {
        let n = self.num_wires();
        let width = device_wires.len();
        let mut probs = Array1::<f64>::zeros(1 << width);

        for (index, value) in state.diagonal().iter().enumerate() {
            let mut sub = 0;
            for (t, wire) in device_wires.iter().enumerate() {
                sub |= ((index >> (n - 1 - wire)) & 1) << (width - 1 - t);
            }
            probs[sub] += value.re;
        }
        probs.mapv_into(f64::abs)
    }

    fn map_or_all(&self, wires: &[WireLabel]) -> Result<Vec<usize>> {
        if wires.is_empty() {
            Ok((0..self.num_wires()).collect())
        } else {
            self.wire_map.map_wires(wires)
        }
    }
}

fn dot(probs: &Array1<f64>, eigvals: &[f64]) -> f64 {
    debug_assert_eq!(probs.len(), eigvals.len());
    probs.iter().zip(eigvals).map(|(p, e)| p * e).sum()
}

/// `Var = E[X²] − E[X]²` over the observable's eigenvalues.
fn variance(probs: &Array1<f64>, eigvals: &[f64]) -> f64 {
    let mean = dot(probs, eigvals);
    let squares: Vec<f64> = eigvals.iter().map(|e| e * e).collect();
    dot(probs, &squares) - mean * mean
}
