use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, trace};

use crate::activation::tanh::Tanh;
use crate::error::{NetworkError, Result};
use crate::loss::squared::SquaredError;
use crate::math::scalar::Scalar;
use crate::network::spec::NetworkSpec;
use crate::network::topology::Topology;

/// Step size used when no learning rate is configured.
pub const DEFAULT_LEARNING_RATE: f64 = 0.00015;

pub type Network32 = Network<f32>;
pub type Network64 = Network<f64>;

/// A fully-connected tanh network trained one sample at a time.
///
/// All state lives in four flat buffers laid out by the [`Topology`]:
/// activations for every layer, biases and errors for every non-input
/// layer, and one weight per edge between adjacent layers. Weights start
/// uniform in `[-0.5, 0.5)`, biases at zero.
///
/// `backward` consumes the activations of the most recent forward pass, so
/// the network tracks whether they are still current: constructing the
/// network, running `backward`, or overwriting a weight or bias all require a
/// new forward pass before the next `backward`.
///
/// The network is not synchronized; share it across threads only behind a
/// lock held for the whole `train` call.
#[derive(Debug, Clone)]
pub struct Network<T: Scalar> {
    topology: Topology,
    values: Vec<T>,
    biases: Vec<T>,
    errors: Vec<T>,
    weights: Vec<T>,
    learning_rate: T,
    rng: StdRng,
    forwarded: bool,
}

/// A completed forward pass whose activations are still in the network.
///
/// Holding a `Pass` borrows the network mutably, so nothing can disturb the
/// activations before [`Pass::backward`] uses them.
pub struct Pass<'a, T: Scalar> {
    network: &'a mut Network<T>,
}

impl<T: Scalar> Network<T> {
    /// Builds a network with entropy-seeded weights and the default learning rate.
    pub fn new(widths: &[usize]) -> Result<Network<T>> {
        Network::build(widths, StdRng::from_entropy(), DEFAULT_LEARNING_RATE)
    }

    /// Builds a network whose initial weights are reproducible from `seed`.
    pub fn with_seed(widths: &[usize], seed: u64) -> Result<Network<T>> {
        Network::build(widths, StdRng::seed_from_u64(seed), DEFAULT_LEARNING_RATE)
    }

    pub fn from_spec(spec: &NetworkSpec) -> Result<Network<T>> {
        let rng = match spec.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Network::build(&spec.layers, rng, spec.learning_rate)
    }

    fn build(widths: &[usize], mut rng: StdRng, learning_rate: f64) -> Result<Network<T>> {
        // Both checks run before any buffer is allocated.
        let topology = Topology::new(widths)?;
        let learning_rate = checked_learning_rate(T::lit(learning_rate), learning_rate)?;

        let init = Uniform::new(T::lit(-0.5), T::lit(0.5));
        let weights = (0..topology.weight_count())
            .map(|_| init.sample(&mut rng))
            .collect();

        debug!(
            layers = ?topology.widths(),
            weights = topology.weight_count(),
            learning_rate = learning_rate.as_f64(),
            "network initialized"
        );

        Ok(Network {
            values: vec![T::zero(); topology.value_count()],
            biases: vec![T::zero(); topology.neuron_count()],
            errors: vec![T::zero(); topology.neuron_count()],
            weights,
            topology,
            learning_rate,
            rng,
            forwarded: false,
        })
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn learning_rate(&self) -> T {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: T) -> Result<()> {
        self.learning_rate = checked_learning_rate(learning_rate, learning_rate.as_f64())?;
        Ok(())
    }

    /// Forward pass; returns an independent copy of the output layer.
    pub fn forward(&mut self, input: &[T]) -> Result<Vec<T>> {
        Ok(self.feed(input)?.output().to_vec())
    }

    /// Forward pass that keeps the activations pinned for a following
    /// [`Pass::backward`].
    pub fn feed(&mut self, input: &[T]) -> Result<Pass<'_, T>> {
        check_len("input", self.topology.input_width(), input.len())?;

        // The input layer is stored verbatim, no activation.
        let input_range = self.topology.value_range(0);
        self.values[input_range].copy_from_slice(input);
        for layer in 1..self.topology.depth() {
            self.activate(layer);
        }
        self.forwarded = true;

        Ok(Pass { network: self })
    }

    /// Backpropagates `target` through the activations of the last forward
    /// pass and applies one delta-rule update to every weight and bias.
    pub fn backward(&mut self, target: &[T]) -> Result<()> {
        check_len("target", self.topology.output_width(), target.len())?;
        if !self.forwarded {
            return Err(NetworkError::NotForwarded);
        }

        trace!(
            loss = SquaredError::loss(self.output(), target).as_f64(),
            "backward step"
        );

        let last = self.topology.depth() - 1;
        self.output_errors(target);
        for layer in (1..last).rev() {
            self.hidden_errors(layer);
        }
        for layer in (1..=last).rev() {
            self.update(layer);
        }
        self.forwarded = false;

        Ok(())
    }

    /// One online training step: forward on `input`, then backward on `target`.
    pub fn train(&mut self, input: &[T], target: &[T]) -> Result<()> {
        // Reject a bad target before the forward pass overwrites anything.
        check_len("target", self.topology.output_width(), target.len())?;
        self.feed(input)?.backward(target)
    }

    /// Activations of the output layer from the last forward pass.
    pub fn output(&self) -> &[T] {
        self.values(self.topology.depth() - 1)
    }

    /// Activations of `layer` from the last forward pass (zeros before the first).
    pub fn values(&self, layer: usize) -> &[T] {
        &self.values[self.topology.value_range(layer)]
    }

    /// Weight from neuron `from` of layer `pair` to neuron `to` of layer `pair + 1`.
    pub fn weight(&self, pair: usize, from: usize, to: usize) -> T {
        self.weights[self.topology.weight_index(pair, from, to)]
    }

    pub fn set_weight(&mut self, pair: usize, from: usize, to: usize, value: T) {
        let index = self.topology.weight_index(pair, from, to);
        self.weights[index] = value;
        self.forwarded = false;
    }

    /// Bias of `neuron` in `layer`; layer 0 has none and panics.
    pub fn bias(&self, layer: usize, neuron: usize) -> T {
        self.biases[self.neuron_index(layer, neuron)]
    }

    pub fn set_bias(&mut self, layer: usize, neuron: usize, value: T) {
        let index = self.neuron_index(layer, neuron);
        self.biases[index] = value;
        self.forwarded = false;
    }

    /// Error (δ) of `neuron` in `layer` from the last backward pass.
    pub fn error(&self, layer: usize, neuron: usize) -> T {
        self.errors[self.neuron_index(layer, neuron)]
    }

    /// Re-expresses the network at another precision. The copy starts
    /// without a current forward pass.
    pub fn cast<U: Scalar>(&self) -> Network<U> {
        fn convert<A: Scalar, B: Scalar>(xs: &[A]) -> Vec<B> {
            xs.iter().map(|&x| B::lit(x.as_f64())).collect()
        }

        Network {
            topology: self.topology.clone(),
            values: convert(&self.values),
            biases: convert(&self.biases),
            errors: convert(&self.errors),
            weights: convert(&self.weights),
            learning_rate: U::lit(self.learning_rate.as_f64()),
            rng: self.rng.clone(),
            forwarded: false,
        }
    }

    fn neuron_index(&self, layer: usize, neuron: usize) -> usize {
        let range = self.topology.neuron_range(layer);
        assert!(
            neuron < range.len(),
            "neuron {neuron} out of range for layer {layer} of width {}",
            range.len()
        );
        range.start + neuron
    }

    /// values[layer][n] = tanh(Σ_p values[layer-1][p] · w[layer-1][p][n] + bias[layer][n])
    fn activate(&mut self, layer: usize) {
        let prev = self.topology.value_range(layer - 1);
        let current = self.topology.value_range(layer);
        let neurons = self.topology.neuron_range(layer);
        let edges = self.topology.weight_range(layer - 1);

        let (before, after) = self.values.split_at_mut(current.start);
        let inputs = &before[prev];
        let outputs = &mut after[..current.len()];
        let biases = &self.biases[neurons];
        let weights = &self.weights[edges];
        let fan_out = outputs.len();

        for (n, out) in outputs.iter_mut().enumerate() {
            let sum = inputs.iter().enumerate()
                .fold(T::zero(), |acc, (p, &x)| acc + x * weights[p * fan_out + n]);
            *out = Tanh::function(sum + biases[n]);
        }
    }

    /// δ_out[n] = (target[n] - y[n]) · (1 - y[n]²)
    fn output_errors(&mut self, target: &[T]) {
        let last = self.topology.depth() - 1;
        let outputs = &self.values[self.topology.value_range(last)];
        let errors = &mut self.errors[self.topology.neuron_range(last)];

        for ((error, &y), &t) in errors.iter_mut().zip(outputs).zip(target) {
            *error = SquaredError::residual(y, t) * Tanh::derivative_from_output(y);
        }
    }

    /// δ[layer][n] = (Σ_m δ[layer+1][m] · w[layer][n][m]) · (1 - y[layer][n]²)
    fn hidden_errors(&mut self, layer: usize) {
        let here = self.topology.neuron_range(layer);
        let next = self.topology.neuron_range(layer + 1);
        let values = &self.values[self.topology.value_range(layer)];
        let weights = &self.weights[self.topology.weight_range(layer)];

        let (before, after) = self.errors.split_at_mut(next.start);
        let errors = &mut before[here];
        let next_errors = &after[..next.len()];
        let fan_out = next_errors.len();

        for (n, error) in errors.iter_mut().enumerate() {
            let row = &weights[n * fan_out..(n + 1) * fan_out];
            let sum = row.iter().zip(next_errors)
                .fold(T::zero(), |acc, (&w, &e)| acc + e * w);
            *error = sum * Tanh::derivative_from_output(values[n]);
        }
    }

    /// bias[layer][n] += δ[n] · rate; w[layer-1][p][n] += y[layer-1][p] · δ[n] · rate
    fn update(&mut self, layer: usize) {
        let rate = self.learning_rate;
        let neurons = self.topology.neuron_range(layer);
        let errors = &self.errors[neurons.clone()];
        let inputs = &self.values[self.topology.value_range(layer - 1)];
        let fan_out = errors.len();

        for (bias, &error) in self.biases[neurons].iter_mut().zip(errors) {
            *bias = *bias + error * rate;
        }

        let weights = &mut self.weights[self.topology.weight_range(layer - 1)];
        for (row, &x) in weights.chunks_exact_mut(fan_out).zip(inputs) {
            for (w, &error) in row.iter_mut().zip(errors) {
                *w = *w + x * error * rate;
            }
        }
    }
}

impl<'a, T: Scalar> Pass<'a, T> {
    pub fn output(&self) -> &[T] {
        self.network.output()
    }

    /// Finishes the training step begun by [`Network::feed`].
    pub fn backward(self, target: &[T]) -> Result<()> {
        self.network.backward(target)
    }
}

fn check_len(what: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(NetworkError::DimensionMismatch { what, expected, got });
    }
    Ok(())
}

fn checked_learning_rate<T: Scalar>(rate: T, requested: f64) -> Result<T> {
    if !(rate.is_finite() && rate > T::zero()) {
        return Err(NetworkError::InvalidLearningRate(requested));
    }
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_follow_topology() {
        let net = Network64::with_seed(&[3, 4, 2], 1).unwrap();
        assert_eq!(net.values.len(), 9);
        assert_eq!(net.biases.len(), 6);
        assert_eq!(net.errors.len(), 6);
        assert_eq!(net.weights.len(), 20);
        assert!(net.biases.iter().all(|&b| b == 0.0));
    }

    #[test]
    fn initial_weights_are_half_open_unit_interval() {
        let net = Network32::with_seed(&[16, 32, 8], 3).unwrap();
        assert!(net.weights.iter().all(|&w| (-0.5..0.5).contains(&w)));
        // A constant vector would also pass the range check.
        assert!(net.weights.iter().any(|&w| w != net.weights[0]));
    }

    #[test]
    fn backward_requires_fresh_forward() {
        let mut net = Network64::with_seed(&[2, 2], 5).unwrap();
        assert!(matches!(net.backward(&[0.0, 0.0]), Err(NetworkError::NotForwarded)));

        net.forward(&[1.0, 0.0]).unwrap();
        net.backward(&[0.0, 0.0]).unwrap();
        assert!(matches!(net.backward(&[0.0, 0.0]), Err(NetworkError::NotForwarded)));

        net.forward(&[1.0, 0.0]).unwrap();
        net.set_bias(1, 0, 0.1);
        assert!(matches!(net.backward(&[0.0, 0.0]), Err(NetworkError::NotForwarded)));
    }

    #[test]
    fn rejected_learning_rates() {
        let mut net = Network64::with_seed(&[1, 1], 0).unwrap();
        assert!(net.set_learning_rate(0.0).is_err());
        assert!(net.set_learning_rate(-0.1).is_err());
        assert!(net.set_learning_rate(f64::NAN).is_err());
        assert_eq!(net.learning_rate(), DEFAULT_LEARNING_RATE);
        net.set_learning_rate(0.5).unwrap();
        assert_eq!(net.learning_rate(), 0.5);
    }

    #[test]
    fn cast_preserves_parameters_within_precision() {
        let net = Network64::with_seed(&[3, 2, 1], 9).unwrap();
        let narrow: Network32 = net.cast();
        for (&wide, &thin) in net.weights.iter().zip(&narrow.weights) {
            assert_eq!(thin, wide as f32);
        }
        assert!(!narrow.forwarded);
    }

    #[test]
    fn train_rejects_bad_target_before_forward() {
        let mut net = Network64::with_seed(&[2, 1], 2).unwrap();
        let err = net.train(&[0.3, 0.4], &[1.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::DimensionMismatch { what: "target", expected: 1, got: 2 }
        ));
        assert!(net.values(0).iter().all(|&v| v == 0.0));
    }
}
