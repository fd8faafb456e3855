// Benchmark of the ant colony on generated longest path instances.
//
// Sizes  : (vertices, extra edges) pairs below
// Seeds  : 10 instances per size
// Score  : best fitness / fitness of the 1 -> 2 -> .. -> N chain (higher is better)
//
// Usage:
//   cargo run --release --example colony_benchmark -- [--seeds N]

use anyhow::{anyhow, Result};
use longpath_algorithms::longest_path::ant_colony::{Colony, Hyperparameters};
use longpath_challenges::longest_path::{Challenge, Difficulty};
use std::{io, time::Instant};

struct Stats {
    values: Vec<f64>,
}

impl Stats {
    fn new() -> Self { Self { values: Vec::new() } }
    fn push(&mut self, v: f64) { self.values.push(v); }
    fn mean(&self) -> f64 { self.values.iter().sum::<f64>() / self.values.len() as f64 }
    fn min(&self) -> f64 { self.values.iter().cloned().fold(f64::INFINITY, f64::min) }
    fn max(&self) -> f64 { self.values.iter().cloned().fold(f64::NEG_INFINITY, f64::max) }
}

const SIZES: [(usize, usize); 4] = [(20, 40), (50, 150), (100, 400), (200, 1000)];

fn make_seed(index: u64) -> [u8; 32] {
    let mut seed = [0u8; 32];
    seed[0..8].copy_from_slice(&index.to_le_bytes());
    seed
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let num_seeds = match args.iter().position(|a| a == "--seeds") {
        Some(i) => args
            .get(i + 1)
            .ok_or_else(|| anyhow!("--seeds expects a value"))?
            .parse::<u64>()?,
        None => 10,
    };
    let params = Hyperparameters::default();

    println!(
        "{:>8} {:>8} {:>10} {:>10} {:>10} {:>10}",
        "vertices", "edges", "avg_ms", "avg_score", "min_score", "max_score"
    );
    for (num_vertices, num_extra_edges) in SIZES {
        let difficulty = Difficulty {
            num_vertices,
            num_extra_edges,
        };
        let mut scores = Stats::new();
        let mut times = Stats::new();
        for seed in 0..num_seeds {
            let mut challenge = Challenge::generate_instance(&make_seed(seed), &difficulty)?;
            let chain: Vec<usize> = (1..=num_vertices).collect();
            let baseline = challenge
                .graph
                .calculate_fitness(&chain)
                .ok_or_else(|| anyhow!("Generated instance has no backbone chain"))?;

            let start = Instant::now();
            let result = Colony::new(&mut challenge.graph, params)?.optimize(&mut io::sink())?;
            times.push(start.elapsed().as_secs_f64() * 1000.0);
            scores.push(result.best_fitness / baseline);
        }
        println!(
            "{:>8} {:>8} {:>10.2} {:>10.4} {:>10.4} {:>10.4}",
            num_vertices,
            num_extra_edges,
            times.mean(),
            scores.mean(),
            scores.min(),
            scores.max()
        );
    }
    Ok(())
}
