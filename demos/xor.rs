use ferrite_mlp::{Network64, NetworkSpec, SquaredError};
use tracing::{info, Level};

fn main() -> ferrite_mlp::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();

    let spec = NetworkSpec::new(vec![2, 3, 1]).with_learning_rate(0.05).with_seed(1);
    let mut network: Network64 = spec.build()?;

    // XOR in tanh's range: -1 is false, 1 is true.
    let samples = [
        ([-1.0, -1.0], [-0.9]),
        ([-1.0, 1.0], [0.9]),
        ([1.0, -1.0], [0.9]),
        ([1.0, 1.0], [-0.9]),
    ];

    let epochs = 5000;
    for epoch in 0..epochs {
        for (input, target) in &samples {
            network.train(input, target)?;
        }
        if epoch % 500 == 0 {
            let mut loss = 0.0;
            for (input, target) in &samples {
                loss += SquaredError::loss(&network.forward(input)?, target);
            }
            info!(epoch, loss, "xor training");
        }
    }

    for (input, _) in &samples {
        println!("Input: {:?} -> Output: {:.4}", input, network.forward(input)?[0]);
    }
    Ok(())
}
