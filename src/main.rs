// Small end-to-end run: learns which half-plane a 2-D point lies in.
// Set RUST_LOG=debug to see the worker pool being sized.
use deeper_nn::{
    Activation, EarlyStopping, FitOptions, LayerSpec, Matrix, Network, Schedule, Sgd,
};
use rand::Rng;
use tracing_subscriber::EnvFilter;

fn main() -> deeper_nn::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let (train_x, train_y) = half_plane(800);
    let (val_x, val_y) = half_plane(200);

    let mut network = Network::new();
    network.add_layer(LayerSpec::Input { size: 2 })?;
    network.add_layer(LayerSpec::Hidden { size: 8, activation: Activation::Sigmoid })?;
    network.add_layer(LayerSpec::Output { size: 2, activation: Activation::Softmax })?;
    network.set_optimizer(Sgd::with_momentum(0.9, true)?);
    network.add_callback(EarlyStopping::new(5));

    let options = FitOptions::new(
        (&train_x, &train_y),
        (&val_x, &val_y),
        30,
        16,
        Schedule::cosine_decay(0.5, 0.01),
    );
    let evaluation = network.fit(&options)?;

    println!("{evaluation}");
    Ok(())
}

/// Points in [-1, 1]²; class 1 when `x + y > 0`.
fn half_plane(n: usize) -> (Vec<Matrix>, Vec<Matrix>) {
    let mut rng = rand::thread_rng();
    (0..n)
        .map(|_| {
            let (a, b): (f64, f64) = (rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
            let label = if a + b > 0.0 { [0.0, 1.0] } else { [1.0, 0.0] };
            (Matrix::column(&[a, b]), Matrix::column(&label))
        })
        .unzip()
}
