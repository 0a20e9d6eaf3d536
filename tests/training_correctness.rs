//! Online training correctness tests.
//!
//! - Convergence on a single-center problem
//! - Online ordering: an N-sample epoch equals N single-sample epochs
//! - Chained epochs
//! - Kernel adaptation moves centers and widths, fixed kernels stay put
//! - Every variant reduces error on a smooth 1-D target

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rbfn::{Adaptation, GaussianRbf, Rbfn, RbfnConfig, RbfnConfigBuilder, RbfnError, Variant};

fn sine_dataset(n: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let xs: Vec<Vec<f64>> = (0..n).map(|_| vec![rng.gen_range(0.0..1.0)]).collect();
    let ys = xs
        .iter()
        .map(|x| vec![(2.0 * std::f64::consts::PI * x[0]).sin()])
        .collect();
    (xs, ys)
}

fn sine_network(variant: Variant, seed: u64) -> Rbfn {
    let config = RbfnConfigBuilder::new()
        .input_dim(1)
        .bases_per_dim(8)
        .output_dim(1)
        .variant(variant)
        .alpha(0.3)
        .eta(1e-4)
        .seed(seed)
        .build()
        .expect("Config should be valid");
    let kernel = GaussianRbf::grid(8, 1, (0.0, 1.0), 0.12).unwrap();
    Rbfn::new(config, kernel).unwrap()
}

#[test]
fn test_single_center_convergence() {
    let kernel = GaussianRbf::new(vec![0.0], vec![1.0], 1).unwrap();
    let config = RbfnConfig {
        input_dim: 1,
        bases_per_dim: 1,
        output_dim: 1,
        alpha: 0.1,
        ..Default::default()
    };
    let mut net = Rbfn::new(config, kernel).unwrap();

    let xs = vec![vec![0.0]];
    let ys = vec![vec![1.0]];
    for _ in 0..100 {
        net.train(&xs, &ys).unwrap();
    }

    let y = net.evaluate(&[0.0]).unwrap();
    assert!((y[0] - 1.0).abs() < 0.01, "converged to {}", y[0]);
}

#[test]
fn test_epoch_equals_sequential_single_samples() {
    let (xs, ys) = sine_dataset(25, 17);
    for variant in Variant::ALL {
        let mut batch = sine_network(variant, 5);
        let mut sequential = sine_network(variant, 5);

        batch.train(&xs, &ys).unwrap();
        for (x, y) in xs.iter().zip(&ys) {
            sequential.train(&[x], &[y]).unwrap();
        }

        assert_eq!(batch.weights(), sequential.weights(), "{:?}", variant);
        assert_eq!(batch.center_weights(), sequential.center_weights());
        assert_eq!(batch.kernel(), sequential.kernel());
    }
}

#[test]
fn test_train_sample_equals_one_element_epoch() {
    let (xs, ys) = sine_dataset(10, 2);
    let mut a = sine_network(Variant::AdaptiveHyperplane, 3);
    let mut b = sine_network(Variant::AdaptiveHyperplane, 3);

    for (x, y) in xs.iter().zip(&ys) {
        a.train_sample(x, y).unwrap();
        b.train(&[x.as_slice()], &[y.as_slice()]).unwrap();
    }
    assert_eq!(a.weights(), b.weights());
    assert_eq!(a.kernel(), b.kernel());
}

#[test]
fn test_order_matters() {
    let (xs, ys) = sine_dataset(10, 4);
    let mut forward = sine_network(Variant::Normalized, 1);
    let mut reversed = sine_network(Variant::Normalized, 1);

    forward.train(&xs, &ys).unwrap();
    let rx: Vec<_> = xs.iter().rev().cloned().collect();
    let ry: Vec<_> = ys.iter().rev().cloned().collect();
    reversed.train(&rx, &ry).unwrap();

    assert_ne!(forward.weights(), reversed.weights());
}

#[test]
fn test_chained_epochs() {
    let (xs, ys) = sine_dataset(12, 8);
    let mut chained = sine_network(Variant::Hyperplane, 6);
    let mut separate = sine_network(Variant::Hyperplane, 6);

    chained.train(&xs, &ys).unwrap().train(&xs, &ys).unwrap();
    separate.train(&xs, &ys).unwrap();
    separate.train(&xs, &ys).unwrap();

    assert_eq!(chained.weights(), separate.weights());
    assert_eq!(chained.center_weights(), separate.center_weights());
}

#[test]
fn test_adaptive_changes_mu_and_sigma() {
    for variant in [Variant::Adaptive, Variant::AdaptiveHyperplane] {
        let mut net = sine_network(variant, 12);
        let before = net.kernel().gaussian().unwrap().clone();

        let loss = net.train_sample(&[0.3], &[2.5]).unwrap();
        assert!(loss > 0.0);

        let after = net.kernel().gaussian().unwrap();
        assert_ne!(after.mu(), before.mu(), "{:?}: mu unchanged", variant);
        assert_ne!(after.sigma(), before.sigma(), "{:?}: sigma unchanged", variant);
    }
}

#[test]
fn test_fixed_kernel_never_moves() {
    let (xs, ys) = sine_dataset(30, 9);
    for variant in [Variant::Rbfn, Variant::Normalized, Variant::Hyperplane] {
        let mut net = sine_network(variant, 12);
        let before = net.kernel().clone();
        net.train_epochs(&xs, &ys, 3).unwrap();
        assert_eq!(net.kernel(), &before, "{:?}", variant);
    }
}

#[test]
fn test_zero_error_no_update() {
    let mut net = sine_network(Variant::AdaptiveHyperplane, 2);
    let target = net.evaluate(&[0.4]).unwrap();
    let weights = net.weights().to_vec();
    let kernel = net.kernel().clone();

    let loss = net.train_sample(&[0.4], &target).unwrap();
    assert_eq!(loss, 0.0);
    assert_eq!(net.weights(), weights.as_slice());
    assert_eq!(net.kernel(), &kernel);
}

#[test]
fn test_degenerate_normalization_poisons_parameters() {
    let kernel = GaussianRbf::new(vec![0.0], vec![1.0], 1).unwrap();
    let mut config = RbfnConfig::for_variant(Variant::Adaptive, 1, 1, 1, 0.1, 0.05);
    config.init_seed = Some(4);
    let mut net = Rbfn::new(config, kernel).unwrap();

    // exp(-5000) underflows, so the normalizer is zero.
    let loss = net.train_sample(&[100.0], &[1.0]).unwrap();
    assert!(loss.is_nan());
    assert!(net.weights()[0].is_nan());

    let k = net.kernel().gaussian().unwrap();
    assert!(k.mu()[0].is_nan());
    assert!(k.sigma()[0].is_nan());
    assert!(net.evaluate(&[0.0]).unwrap()[0].is_nan());
}

#[test]
fn test_every_variant_learns_sine() {
    let (xs, ys) = sine_dataset(60, 1);
    for variant in Variant::ALL {
        let mut net = sine_network(variant, 31);
        let initial = net.mse(&xs, &ys).unwrap();
        let final_mse = net.train_epochs(&xs, &ys, 200).unwrap();

        assert!(final_mse.is_finite(), "{:?} diverged", variant);
        assert!(
            final_mse < 0.5 * initial,
            "{:?}: mse {} -> {}",
            variant,
            initial,
            final_mse
        );
        assert!(final_mse < 0.1, "{:?}: final mse {}", variant, final_mse);
    }
}

#[test]
fn test_train_epochs_zero_reports_current_mse() {
    let (xs, ys) = sine_dataset(5, 3);
    let mut net = sine_network(Variant::Normalized, 0);
    let mse = net.mse(&xs, &ys).unwrap();
    assert_eq!(net.train_epochs(&xs, &ys, 0).unwrap(), mse);
}

#[test]
fn test_sample_count_mismatch() {
    let (xs, ys) = sine_dataset(5, 3);
    let mut net = sine_network(Variant::Rbfn, 0);
    match net.train(&xs, &ys[..4]) {
        Err(RbfnError::SampleCountMismatch { inputs, targets }) => {
            assert_eq!(inputs, 5);
            assert_eq!(targets, 4);
        }
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("expected an error"),
    }
    assert!(net.mse(&xs[..2], &ys).is_err());
}

#[test]
fn test_empty_epoch_is_noop() {
    let mut net = sine_network(Variant::AdaptiveHyperplane, 0);
    let before = net.clone();
    let xs: Vec<Vec<f64>> = Vec::new();
    let ys: Vec<Vec<f64>> = Vec::new();
    net.train(&xs, &ys).unwrap();
    assert_eq!(net.weights(), before.weights());
    assert_eq!(net.mse(&xs, &ys).unwrap(), 0.0);
}

#[test]
fn test_eta_zero_keeps_kernel() {
    let mut config = RbfnConfig::for_variant(Variant::Adaptive, 1, 4, 1, 0.2, 0.0);
    config.init_seed = Some(1);
    assert_eq!(config.adaptation, Adaptation::Kernel { eta: 0.0 });
    let kernel = GaussianRbf::grid(4, 1, (0.0, 1.0), 0.3).unwrap();
    let mut net = Rbfn::new(config, kernel.clone()).unwrap();

    let (xs, ys) = sine_dataset(10, 5);
    net.train(&xs, &ys).unwrap();
    assert_eq!(net.kernel().gaussian().unwrap(), &kernel);
}
