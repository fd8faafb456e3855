use super::{path_builder::PathBuilder, selector::RandomSource, Hyperparameters};
use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use logging_timer::time;
use longpath_challenges::longest_path::{Graph, GraphResult, SOURCE_VERTEX};
use std::{fmt, io::Write};

/// Added to an edge's pheromone for every reinforcing path that uses it.
pub const PHEROMONE_INCREMENT: f64 = 3.0;

/// One line of the progress log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressRecord {
    pub iteration: usize,
    pub best_fitness: f64,
    pub avg_fitness: f64,
}

impl fmt::Display for ProgressRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.iteration, self.best_fitness, self.avg_fitness)
    }
}

#[derive(Debug, Clone)]
pub struct OptimizeResult {
    pub path: Vec<usize>,
    pub best_fitness: f64,
    pub avg_fitness: f64,
    pub history: Vec<ProgressRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColonyState {
    Idle,
    Running,
    Done,
}

/// Ant colony searching for the longest simple path from vertex `1` to
/// vertex `N`. Pheromones are updated in place on the borrowed graph.
pub struct Colony<'g> {
    graph: &'g mut Graph,
    params: Hyperparameters,
    rng: RandomSource,
    state: ColonyState,
}

impl<'g> Colony<'g> {
    pub fn new(graph: &'g mut Graph, params: Hyperparameters) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            graph,
            rng: RandomSource::new(params.seed),
            params,
            state: ColonyState::Idle,
        })
    }

    pub fn state(&self) -> ColonyState {
        self.state
    }

    pub fn graph(&self) -> &Graph {
        &*self.graph
    }

    /// Runs every ant once and reinforces the graph.
    ///
    /// Each valid path gets one deposit per edge, then the iteration best gets
    /// a second one. Returns the best path and its fitness, or an empty path
    /// with fitness 0 when no ant reached the destination.
    pub fn build_solution(&mut self) -> Result<(Vec<usize>, f64)> {
        let source = SOURCE_VERTEX;
        let dest = self.graph.num_vertices();

        let mut paths = Vec::with_capacity(self.params.num_ants);
        let mut builder = PathBuilder::new(self.graph, &mut self.rng);
        for ant in 0..self.params.num_ants {
            match builder.generate_path(source, dest)? {
                Some(path) => paths.push(path),
                None => debug!("Ant {} found no path", ant),
            }
        }

        let mut best: Option<(usize, f64)> = None;
        for (i, path) in paths.iter().enumerate() {
            let fitness = match self.graph.calculate_fitness(path) {
                Some(fitness) => fitness,
                None => {
                    debug!("Rejecting invalid path {:?}", path);
                    continue;
                }
            };
            if best.map_or(true, |(_, best_fitness)| fitness > best_fitness) {
                best = Some((i, fitness));
            }
            deposit(self.graph, path)?;
        }

        match best {
            Some((i, fitness)) => {
                let best_path = paths.swap_remove(i);
                deposit(self.graph, &best_path)?;
                Ok((best_path, fitness))
            }
            None => {
                warn!(
                    "None of {} ants found a path from {} to {}",
                    self.params.num_ants, source, dest
                );
                Ok((Vec::new(), 0.0))
            }
        }
    }

    /// Runs all iterations, writing one `iteration,best,avg` line per
    /// iteration to `progress`. A colony can only be optimised once.
    #[time]
    pub fn optimize<W: Write>(&mut self, progress: &mut W) -> Result<OptimizeResult> {
        if self.state != ColonyState::Idle {
            return Err(anyhow!("Colony has already been optimized"));
        }
        self.state = ColonyState::Running;

        let iterations = self.params.iterations;
        let mut best_path = Vec::new();
        let mut best_fitness = 0.0;
        let mut fitness_sum = 0.0;
        let mut history = Vec::with_capacity(iterations);

        for iteration in 1..=iterations {
            let (path, fitness) = self.build_solution()?;
            fitness_sum += fitness;
            if fitness > best_fitness || (best_path.is_empty() && !path.is_empty()) {
                best_path = path;
                best_fitness = fitness;
            }
            self.graph.evaporate_pheromones(self.params.evaporation_rate)?;

            let record = ProgressRecord {
                iteration,
                best_fitness,
                avg_fitness: fitness_sum / iteration as f64,
            };
            writeln!(progress, "{}", record)?;
            info!(
                "Iteration {}/{}: best {} avg {}",
                iteration, iterations, record.best_fitness, record.avg_fitness
            );
            history.push(record);
        }
        progress.flush()?;

        self.state = ColonyState::Done;
        Ok(OptimizeResult {
            path: best_path,
            best_fitness,
            avg_fitness: fitness_sum / iterations as f64,
            history,
        })
    }
}

fn deposit(graph: &mut Graph, path: &[usize]) -> GraphResult<()> {
    for w in path.windows(2) {
        let pheromone = graph.get_pheromone(w[0], w[1])?;
        graph.set_pheromone(w[0], w[1], pheromone + PHEROMONE_INCREMENT)?;
    }
    Ok(())
}
