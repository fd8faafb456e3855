//! Ant colony optimisation for the longest simple path problem.
//!
//! Every iteration each ant walks from vertex `1` towards vertex `N`, picking
//! the next vertex with probability proportional to `weight * pheromone` and
//! never revisiting a vertex. Edges of every finished walk receive a fixed
//! pheromone deposit, the iteration best receives a second one, and then all
//! pheromones evaporate.

mod colony;
mod path_builder;
mod selector;
pub use colony::*;
pub use path_builder::*;
pub use selector::*;

use anyhow::{anyhow, Result};
use longpath_challenges::longest_path::{Challenge, Solution};
use serde::{Deserialize, Serialize};
use serde_json::{from_value, Map, Value};
use std::io;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Hyperparameters {
    pub iterations: usize,
    pub num_ants: usize,
    pub evaporation_rate: f64,
    pub seed: u64,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            iterations: 100,
            num_ants: 10,
            evaporation_rate: 0.1,
            seed: 1,
        }
    }
}

impl Hyperparameters {
    pub fn from_map(hyperparameters: &Option<Map<String, Value>>) -> Result<Self> {
        let params = match hyperparameters {
            Some(map) => from_value::<Self>(Value::Object(map.clone()))
                .map_err(|e| anyhow!("Invalid hyperparameters: {}", e))?,
            None => Self::default(),
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(anyhow!("iterations must be positive"));
        }
        if self.num_ants == 0 {
            return Err(anyhow!("num_ants must be positive"));
        }
        if !(0.0..=1.0).contains(&self.evaporation_rate) {
            return Err(anyhow!(
                "evaporation_rate ({}) must be within [0, 1]",
                self.evaporation_rate
            ));
        }
        Ok(())
    }
}

pub fn solve_challenge(
    challenge: &Challenge,
    save_solution: &dyn Fn(&Solution) -> Result<()>,
    hyperparameters: &Option<Map<String, Value>>,
) -> Result<()> {
    let params = Hyperparameters::from_map(hyperparameters)?;
    let mut graph = challenge.graph.clone();
    let mut colony = Colony::new(&mut graph, params)?;
    let result = colony.optimize(&mut io::sink())?;
    if !result.path.is_empty() {
        save_solution(&Solution { path: result.path })?;
    }
    Ok(())
}

pub fn help() {
    println!("Ant colony optimisation for the longest simple path from vertex 1 to vertex N");
    println!();
    println!("Hyperparameters:");
    println!("  iterations: Number of colony iterations (default: 100)");
    println!("  num_ants: Number of ants per iteration (default: 10)");
    println!("  evaporation_rate: Pheromone decay per iteration, within [0, 1] (default: 0.1)");
    println!("  seed: Seed of the random stream (default: 1)");
}
