use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, Result};

/// Layer widths plus the offsets that map (layer, neuron) and
/// (pair, from, to) coordinates into the network's flat buffers.
///
/// Three arenas hang off a topology:
/// - values: every neuron of every layer, input layer included;
/// - neurons (biases and errors): every neuron of layers `1..depth`, the
///   input layer has no bias or error slot;
/// - weights: for pair `i` (layer `i` to `i + 1`), row-major `[from][to]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Topology {
    widths: Vec<usize>,
    value_offsets: Vec<usize>,
    neuron_offsets: Vec<usize>,
    weight_offsets: Vec<usize>,
}

impl Topology {
    /// Validates `widths` and precomputes the arena offsets.
    ///
    /// Fails with `InvalidTopology` for fewer than two layers or any zero width.
    pub fn new(widths: &[usize]) -> Result<Topology> {
        if widths.len() < 2 {
            return Err(NetworkError::InvalidTopology {
                reason: format!("need at least 2 layers, got {}", widths.len()),
            });
        }
        if let Some(layer) = widths.iter().position(|&w| w == 0) {
            return Err(NetworkError::InvalidTopology {
                reason: format!("layer {layer} has width 0"),
            });
        }

        // Each offset table carries a trailing total so ranges are offsets[i]..offsets[i + 1].
        let value_offsets = prefix_sums(widths.iter().copied());
        let neuron_offsets = prefix_sums(widths[1..].iter().copied());
        let weight_offsets = prefix_sums(widths.windows(2).map(|pair| pair[0] * pair[1]));

        Ok(Topology {
            widths: widths.to_vec(),
            value_offsets,
            neuron_offsets,
            weight_offsets,
        })
    }

    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    /// Number of layers, input and output included.
    pub fn depth(&self) -> usize {
        self.widths.len()
    }

    pub fn width(&self, layer: usize) -> usize {
        self.widths[layer]
    }

    pub fn input_width(&self) -> usize {
        self.widths[0]
    }

    pub fn output_width(&self) -> usize {
        self.widths[self.widths.len() - 1]
    }

    pub fn value_count(&self) -> usize {
        *self.value_offsets.last().unwrap_or(&0)
    }

    /// Neurons that own a bias and an error, i.e. all but the input layer.
    pub fn neuron_count(&self) -> usize {
        *self.neuron_offsets.last().unwrap_or(&0)
    }

    pub fn weight_count(&self) -> usize {
        *self.weight_offsets.last().unwrap_or(&0)
    }

    /// Slice of the value arena holding `layer`.
    pub fn value_range(&self, layer: usize) -> Range<usize> {
        self.value_offsets[layer]..self.value_offsets[layer + 1]
    }

    /// Slice of the bias/error arenas holding `layer`. Panics for layer 0.
    pub fn neuron_range(&self, layer: usize) -> Range<usize> {
        assert!(layer >= 1, "the input layer has no biases or errors");
        self.neuron_offsets[layer - 1]..self.neuron_offsets[layer]
    }

    /// Slice of the weight arena connecting layer `pair` to layer `pair + 1`.
    pub fn weight_range(&self, pair: usize) -> Range<usize> {
        self.weight_offsets[pair]..self.weight_offsets[pair + 1]
    }

    /// Flat index of the weight from neuron `from` in layer `pair` to
    /// neuron `to` in layer `pair + 1`.
    pub fn weight_index(&self, pair: usize, from: usize, to: usize) -> usize {
        let fan_out = self.widths[pair + 1];
        assert!(
            from < self.widths[pair] && to < fan_out,
            "weight ({from}, {to}) out of range for pair {pair}"
        );
        self.weight_offsets[pair] + from * fan_out + to
    }
}

impl TryFrom<Vec<usize>> for Topology {
    type Error = NetworkError;

    fn try_from(widths: Vec<usize>) -> Result<Topology> {
        Topology::new(&widths)
    }
}

impl From<Topology> for Vec<usize> {
    fn from(topology: Topology) -> Vec<usize> {
        topology.widths
    }
}

fn prefix_sums(sizes: impl Iterator<Item = usize>) -> Vec<usize> {
    let mut offsets = vec![0];
    let mut total = 0;
    for size in sizes {
        total += size;
        offsets.push(total);
    }
    offsets
}
