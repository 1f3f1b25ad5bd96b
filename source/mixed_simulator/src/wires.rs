// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::error::{Error, Result};
use rustc_hash::FxHashMap;
use std::fmt::{self, Display, Formatter};

/// The hard limit on the register size. Memory scales as `4^N` complex
/// entries, so 23 wires already means a 128 TiB density matrix.
pub const MAX_WIRES: usize = 23;

/// A user-facing wire label: either a plain index or a named wire.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum WireLabel {
    Index(usize),
    Name(String),
}

impl Display for WireLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            WireLabel::Index(i) => write!(f, "{i}"),
            WireLabel::Name(name) => write!(f, "{name}"),
        }
    }
}

impl From<usize> for WireLabel {
    fn from(index: usize) -> Self {
        WireLabel::Index(index)
    }
}

impl From<&str> for WireLabel {
    fn from(name: &str) -> Self {
        WireLabel::Name(name.to_string())
    }
}

impl From<String> for WireLabel {
    fn from(name: String) -> Self {
        WireLabel::Name(name)
    }
}

/// The wire register a device is constructed with: either a wire count
/// (labels `0..n`) or an explicit label list.
#[derive(Clone, Debug)]
pub enum Wires {
    Count(usize),
    Labels(Vec<WireLabel>),
}

impl From<usize> for Wires {
    fn from(count: usize) -> Self {
        Wires::Count(count)
    }
}

impl From<Vec<WireLabel>> for Wires {
    fn from(labels: Vec<WireLabel>) -> Self {
        Wires::Labels(labels)
    }
}

/// Injective mapping from user-facing wire labels to dense device indices
/// `0..N-1`, fixed at device construction.
#[derive(Clone, Debug)]
pub struct WireMap {
    labels: Vec<WireLabel>,
    indices: FxHashMap<WireLabel, usize>,
}

impl WireMap {
    pub fn new(wires: impl Into<Wires>) -> Result<Self> {
        let labels = match wires.into() {
            Wires::Count(count) => (0..count).map(WireLabel::Index).collect(),
            Wires::Labels(labels) => labels,
        };
        if labels.len() > MAX_WIRES {
            return Err(Error::TooManyWires(labels.len()));
        }
        let mut indices = FxHashMap::default();
        for (index, label) in labels.iter().enumerate() {
            if indices.insert(label.clone(), index).is_some() {
                return Err(Error::DuplicateWire(label.to_string()));
            }
        }
        Ok(Self { labels, indices })
    }

    /// The number of wires on the device.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// All device labels, in device-index order.
    #[must_use]
    pub fn labels(&self) -> &[WireLabel] {
        &self.labels
    }

    /// Translates one user label to its dense device index.
    pub fn index_of(&self, label: &WireLabel) -> Result<usize> {
        self.indices
            .get(label)
            .copied()
            .ok_or_else(|| Error::UnknownWire(label.to_string()))
    }

    /// Translates a list of user labels to dense device indices,
    /// preserving order.
    pub fn map_wires(&self, labels: &[WireLabel]) -> Result<Vec<usize>> {
        labels.iter().map(|label| self.index_of(label)).collect()
    }
}
