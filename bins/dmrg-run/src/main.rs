use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use dmrg_core::{SweepParams, Sweeper};
use dmrg_mpo::builders;
use dmrg_tensor::{GTensor3, C64};

/// Two-site DMRG ground-state solver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Hamiltonian: identity | ising | heisenberg
    #[arg(long, value_enum, default_value_t = Model::Ising)]
    model: Model,

    /// Chain length
    #[arg(long, default_value_t = 10)]
    n: usize,

    /// Transverse field strength (ising only)
    #[arg(long, default_value_t = 1.0)]
    h: f64,

    /// Coupling strength (ising, heisenberg)
    #[arg(long, default_value_t = 1.0)]
    j: f64,

    /// Optional TOML file with SweepParams; CLI flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of outer sweeps
    #[arg(long)]
    sweeps: Option<usize>,

    /// Minimum kept bond dimension per SVD split
    #[arg(long)]
    d_min: Option<usize>,

    /// Maximum kept bond dimension per SVD split
    #[arg(long)]
    d_max: Option<usize>,

    /// Target per-bond truncation error
    #[arg(long)]
    trunc_err: Option<f64>,

    /// Lanczos energy tolerance
    #[arg(long)]
    lancz_error: Option<f64>,

    /// Lanczos Krylov dimension cap
    #[arg(long)]
    lancz_max_iterations: Option<usize>,

    /// Directory for persisted MPS site tensors
    #[arg(long)]
    mps_path: Option<PathBuf>,

    /// Directory for persisted block operator groups
    #[arg(long)]
    temp_path: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Model {
    Identity,
    Ising,
    Heisenberg,
}

fn load_params(args: &Args) -> Result<SweepParams> {
    let mut params = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            SweepParams::from_toml_str(&text)
                .with_context(|| format!("parsing config file {}", path.display()))?
        }
        None => SweepParams::default(),
    };

    if let Some(v) = args.sweeps {
        params.sweeps = v;
    }
    if let Some(v) = args.d_min {
        params.d_min = v;
    }
    if let Some(v) = args.d_max {
        params.d_max = v;
    }
    if let Some(v) = args.trunc_err {
        params.trunc_err = v;
    }
    if let Some(v) = args.lancz_error {
        params.lancz_params.error = v;
    }
    if let Some(v) = args.lancz_max_iterations {
        params.lancz_params.max_iterations = v;
    }
    if let Some(v) = args.mps_path.clone() {
        params.mps_path = v;
    }
    if let Some(v) = args.temp_path.clone() {
        params.temp_path = v;
    }

    Ok(params)
}

fn product_state(n: usize, phys_dim: usize) -> dmrg_core::Mps {
    let mut sites = Vec::with_capacity(n);
    for _ in 0..n {
        let mut t = GTensor3::zeros(1, phys_dim, 1);
        t.set(0, 0, 0, C64::new(1.0, 0.0));
        sites.push(t);
    }
    dmrg_core::Mps::new(sites)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let params = load_params(&args)?;

    let mpo = match args.model {
        Model::Identity => builders::identity(args.n, 2),
        Model::Ising => builders::ising(args.n, args.h, args.j),
        Model::Heisenberg => builders::heisenberg(args.n, args.j),
    };

    let mps = product_state(args.n, mpo.phys_dim);
    let mut sweeper = Sweeper::new(mps, mpo, params).context("constructing sweep orchestrator")?;
    let energy = sweeper.run().context("running DMRG sweep")?;

    println!("ground energy: {energy:.10}");
    println!("energy per site: {:.10}", energy / args.n as f64);
    Ok(())
}
