use super::selector::{select, RandomSource};
use crate::{seeded_hasher, HashSet};
use log::debug;
use longpath_challenges::longest_path::{Graph, GraphError, GraphResult};
use std::collections::BTreeMap;

/// Normalised `weight * pheromone` distribution over the neighbours of
/// `vertex`, in ascending neighbour order.
///
/// `Ok(None)` means the ant is stuck: the vertex has no outgoing edges or
/// every score is zero.
pub fn calculate_probabilities(
    graph: &Graph,
    vertex: usize,
) -> GraphResult<Option<BTreeMap<usize, f64>>> {
    let scores: BTreeMap<usize, f64> = graph
        .outgoing(vertex)?
        .iter()
        .map(|(&dest, edge)| (dest, edge.weight() * edge.pheromone()))
        .collect();
    let total: f64 = scores.values().sum();
    if scores.is_empty() || !(total > 0.0) || !total.is_finite() {
        return Ok(None);
    }
    Ok(Some(
        scores
            .into_iter()
            .map(|(dest, score)| (dest, score / total))
            .collect(),
    ))
}

/// Builds one random simple path per call, biased by `weight * pheromone`.
pub struct PathBuilder<'a> {
    graph: &'a Graph,
    rng: &'a mut RandomSource,
}

impl<'a> PathBuilder<'a> {
    pub fn new(graph: &'a Graph, rng: &'a mut RandomSource) -> Self {
        Self { graph, rng }
    }

    /// Random walk from `source` until `dest` is reached.
    ///
    /// Returns `Ok(None)` when the ant gives up: a dead end, `num_vertices`
    /// redraws after a first draw that all land on visited vertices, or more
    /// than `num_vertices` steps. Unknown endpoints are an error.
    pub fn generate_path(&mut self, source: usize, dest: usize) -> GraphResult<Option<Vec<usize>>> {
        for vertex in [source, dest] {
            if !self.graph.contains_vertex(vertex) {
                return Err(GraphError::VertexNotFound { vertex });
            }
        }
        let num_vertices = self.graph.num_vertices();
        let mut path = vec![source];
        let mut visited = HashSet::with_hasher(seeded_hasher(self.rng.seed()));
        visited.insert(source);
        let mut current = source;
        let mut steps = 0;

        while current != dest {
            let probabilities = match calculate_probabilities(self.graph, current)? {
                Some(probabilities) => probabilities,
                None => {
                    debug!("Dead end at vertex {}", current);
                    return Ok(None);
                }
            };

            let mut tries = 0;
            let next = loop {
                let candidate = match select(self.rng, &probabilities) {
                    Some(candidate) => candidate,
                    None => return Ok(None),
                };
                if !visited.contains(&candidate) {
                    break candidate;
                }
                if tries >= num_vertices {
                    debug!(
                        "Gave up after {} redraws at vertex {} (path length {})",
                        tries,
                        current,
                        path.len()
                    );
                    return Ok(None);
                }
                tries += 1;
            };

            path.push(next);
            visited.insert(next);
            current = next;
            steps += 1;
            if steps > num_vertices {
                return Ok(None);
            }
        }
        Ok(Some(path))
    }
}
