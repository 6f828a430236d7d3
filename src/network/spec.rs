use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::math::scalar::Scalar;
use crate::network::network::{Network, DEFAULT_LEARNING_RATE};

fn default_learning_rate() -> f64 {
    DEFAULT_LEARNING_RATE
}

/// A serializable description of a network: layer widths, learning rate and
/// an optional RNG seed for reproducible weight initialization.
///
/// The spec is plain configuration; it carries no trained weights. A missing
/// `learning_rate` falls back to `DEFAULT_LEARNING_RATE`, a missing `seed`
/// means the weights are drawn from an entropy-seeded generator.
///
/// ```
/// use ferrite_mlp::NetworkSpec;
///
/// let spec = NetworkSpec::from_json(r#"{ "layers": [2, 3, 1], "seed": 7 }"#).unwrap();
/// let mut net = spec.build::<f64>().unwrap();
/// assert_eq!(net.forward(&[0.5, -0.5]).unwrap().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Ordered layer widths (input → output), at least two entries.
    pub layers: Vec<usize>,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl NetworkSpec {
    pub fn new(layers: Vec<usize>) -> NetworkSpec {
        NetworkSpec {
            layers,
            learning_rate: DEFAULT_LEARNING_RATE,
            seed: None,
        }
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> NetworkSpec {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> NetworkSpec {
        self.seed = Some(seed);
        self
    }

    /// Parses a spec from a JSON string.
    pub fn from_json(json: &str) -> Result<NetworkSpec> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the spec to a pretty-printed JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds a freshly initialized network at precision `T`.
    pub fn build<T: Scalar>(&self) -> Result<Network<T>> {
        Network::from_spec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;

    #[test]
    fn missing_fields_take_defaults() {
        let spec = NetworkSpec::from_json(r#"{ "layers": [4, 2] }"#).unwrap();
        assert_eq!(spec, NetworkSpec::new(vec![4, 2]));
        assert_eq!(spec.learning_rate, DEFAULT_LEARNING_RATE);
        assert_eq!(spec.seed, None);
    }

    #[test]
    fn json_round_trip_keeps_every_field() {
        let spec = NetworkSpec::new(vec![2, 5, 1]).with_learning_rate(0.05).with_seed(11);
        let back = NetworkSpec::from_json(&spec.to_json().unwrap()).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            NetworkSpec::from_json("{ layers: }"),
            Err(NetworkError::Config(_))
        ));
    }

    #[test]
    fn build_validates_topology_and_rate() {
        assert!(matches!(
            NetworkSpec::new(vec![3]).build::<f64>(),
            Err(NetworkError::InvalidTopology { .. })
        ));
        assert!(matches!(
            NetworkSpec::new(vec![3, 1]).with_learning_rate(0.0).build::<f32>(),
            Err(NetworkError::InvalidLearningRate(_))
        ));
    }

    #[test]
    fn seeded_specs_build_identical_networks() {
        let spec = NetworkSpec::new(vec![3, 4, 2]).with_seed(42);
        let mut a = spec.build::<f64>().unwrap();
        let mut b = spec.build::<f64>().unwrap();
        let x = [0.1, 0.2, 0.3];
        assert_eq!(a.forward(&x).unwrap(), b.forward(&x).unwrap());
    }
}
