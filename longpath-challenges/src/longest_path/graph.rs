use log::debug;
use std::collections::{BTreeMap, HashSet};

pub const INIT_PHEROMONE: f64 = 1.0;
/// Largest vertex id a graph accepts. Ids index a dense adjacency array.
pub const MAX_VERTEX_ID: usize = 1 << 24;

#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    VertexNotFound {
        vertex: usize,
    },
    VertexOutOfRange {
        vertex: usize,
    },
    EdgeNotFound {
        source: usize,
        dest: usize,
    },
    InvalidWeight {
        source: usize,
        dest: usize,
        weight: f64,
    },
    InvalidPheromone {
        source: usize,
        dest: usize,
        pheromone: f64,
    },
    InvalidEvaporationRate {
        rate: f64,
    },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::VertexNotFound { vertex } => {
                write!(f, "Vertex '{}' does not exist", vertex)
            }
            GraphError::VertexOutOfRange { vertex } => write!(
                f,
                "Vertex '{}' is out of range. Must be at most {}",
                vertex, MAX_VERTEX_ID
            ),
            GraphError::EdgeNotFound { source, dest } => {
                write!(f, "Edge '{} -> {}' does not exist", source, dest)
            }
            GraphError::InvalidWeight {
                source,
                dest,
                weight,
            } => write!(
                f,
                "Weight '{}' for edge '{} -> {}' is invalid. Must be finite and non-negative",
                weight, source, dest
            ),
            GraphError::InvalidPheromone {
                source,
                dest,
                pheromone,
            } => write!(
                f,
                "Pheromone '{}' for edge '{} -> {}' is invalid. Must be finite and non-negative",
                pheromone, source, dest
            ),
            GraphError::InvalidEvaporationRate { rate } => write!(
                f,
                "Evaporation rate '{}' is invalid. Must be within [0, 1]",
                rate
            ),
        }
    }
}

impl std::error::Error for GraphError {}

pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// A directed edge record. The weight is fixed at build time, the pheromone
/// changes every iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    weight: f64,
    pheromone: f64,
}

impl Edge {
    fn new(weight: f64) -> Self {
        Self {
            weight,
            pheromone: INIT_PHEROMONE,
        }
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn pheromone(&self) -> f64 {
        self.pheromone
    }
}

/// Directed weighted graph annotated with pheromones.
///
/// Vertices are dense integer ids. `adjacency[v]` is `None` until `v` is
/// created and otherwise holds the outgoing edges of `v` keyed by destination,
/// so neighbours are always enumerated in ascending order.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    adjacency: Vec<Option<BTreeMap<usize, Edge>>>,
    num_vertices: usize,
    num_edges: usize,
    max_weight: f64,
}

fn check_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn check_vertex_id(vertex: usize) -> GraphResult<()> {
    if vertex > MAX_VERTEX_ID {
        return Err(GraphError::VertexOutOfRange { vertex });
    }
    Ok(())
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `source -> dest`, creating missing endpoints. Re-adding an
    /// existing edge resets both its weight and its pheromone.
    pub fn add_edge(&mut self, source: usize, dest: usize, weight: f64) -> GraphResult<()> {
        if !check_non_negative(weight) {
            return Err(GraphError::InvalidWeight {
                source,
                dest,
                weight,
            });
        }
        check_vertex_id(source)?;
        check_vertex_id(dest)?;
        if !self.contains_vertex(source) {
            self.create_vertex(source)?;
        }
        if !self.contains_vertex(dest) {
            self.create_vertex(dest)?;
        }
        let edges = self.adjacency[source]
            .as_mut()
            .ok_or(GraphError::VertexNotFound { vertex: source })?;
        if edges.insert(dest, Edge::new(weight)).is_none() {
            self.num_edges += 1;
        }
        self.max_weight = self.max_weight.max(weight);
        Ok(())
    }

    /// Inserts an isolated vertex. An existing vertex loses its outgoing edges.
    pub fn create_vertex(&mut self, vertex: usize) -> GraphResult<()> {
        check_vertex_id(vertex)?;
        if vertex >= self.adjacency.len() {
            self.adjacency.resize_with(vertex + 1, || None);
        }
        match self.adjacency[vertex].replace(BTreeMap::new()) {
            Some(old_edges) => self.num_edges -= old_edges.len(),
            None => self.num_vertices += 1,
        }
        Ok(())
    }

    pub fn contains_vertex(&self, vertex: usize) -> bool {
        matches!(self.adjacency.get(vertex), Some(Some(_)))
    }

    pub fn contains_edge(&self, source: usize, dest: usize) -> bool {
        self.edge(source, dest).is_ok()
    }

    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    pub fn max_weight(&self) -> f64 {
        self.max_weight
    }

    /// Ids of all created vertices in ascending order.
    pub fn vertices(&self) -> impl Iterator<Item = usize> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .filter_map(|(vertex, edges)| edges.as_ref().map(|_| vertex))
    }

    /// Every edge as `(source, dest, edge)`, ordered by source then dest.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, &Edge)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .filter_map(|(source, edges)| edges.as_ref().map(|edges| (source, edges)))
            .flat_map(|(source, edges)| edges.iter().map(move |(&dest, edge)| (source, dest, edge)))
    }

    pub fn outgoing(&self, vertex: usize) -> GraphResult<&BTreeMap<usize, Edge>> {
        self.adjacency
            .get(vertex)
            .and_then(|edges| edges.as_ref())
            .ok_or(GraphError::VertexNotFound { vertex })
    }

    pub fn get_neighbors(&self, vertex: usize) -> GraphResult<Vec<usize>> {
        Ok(self.outgoing(vertex)?.keys().cloned().collect())
    }

    pub fn edge(&self, source: usize, dest: usize) -> GraphResult<&Edge> {
        self.outgoing(source)
            .ok()
            .and_then(|edges| edges.get(&dest))
            .ok_or(GraphError::EdgeNotFound { source, dest })
    }

    fn edge_mut(&mut self, source: usize, dest: usize) -> GraphResult<&mut Edge> {
        self.adjacency
            .get_mut(source)
            .and_then(|edges| edges.as_mut())
            .and_then(|edges| edges.get_mut(&dest))
            .ok_or(GraphError::EdgeNotFound { source, dest })
    }

    pub fn get_weight(&self, source: usize, dest: usize) -> GraphResult<f64> {
        Ok(self.edge(source, dest)?.weight)
    }

    pub fn set_weight(&mut self, source: usize, dest: usize, weight: f64) -> GraphResult<()> {
        if !check_non_negative(weight) {
            return Err(GraphError::InvalidWeight {
                source,
                dest,
                weight,
            });
        }
        self.edge_mut(source, dest)?.weight = weight;
        self.max_weight = self.max_weight.max(weight);
        Ok(())
    }

    pub fn get_pheromone(&self, source: usize, dest: usize) -> GraphResult<f64> {
        Ok(self.edge(source, dest)?.pheromone)
    }

    pub fn set_pheromone(&mut self, source: usize, dest: usize, pheromone: f64) -> GraphResult<()> {
        if !check_non_negative(pheromone) {
            return Err(GraphError::InvalidPheromone {
                source,
                dest,
                pheromone,
            });
        }
        self.edge_mut(source, dest)?.pheromone = pheromone;
        Ok(())
    }

    /// A path longer than the vertex count cannot be simple.
    pub fn is_path_simple(&self, path: &[usize]) -> bool {
        if path.len() > self.num_vertices {
            debug!("Path of length {} has cycles", path.len());
            return false;
        }
        let mut seen = HashSet::with_capacity(path.len());
        if let Some(vertex) = path.iter().find(|&&vertex| !seen.insert(vertex)) {
            debug!("Path revisits vertex {}", vertex);
            return false;
        }
        true
    }

    pub fn is_path_valid(&self, path: &[usize]) -> bool {
        if path.is_empty() {
            return true;
        }
        if !self.is_path_simple(path) {
            return false;
        }
        if let Some(&vertex) = path.iter().find(|&&vertex| !self.contains_vertex(vertex)) {
            debug!("Invalid path. Vertex {} does not exist", vertex);
            return false;
        }
        for w in path.windows(2) {
            if !self.contains_edge(w[0], w[1]) {
                debug!("Invalid path. No edge from {} to {}", w[0], w[1]);
                return false;
            }
        }
        true
    }

    /// Sum of edge weights along `path`.
    ///
    /// `Some(0.0)` for an empty or single vertex path, `None` when the path is
    /// invalid.
    pub fn calculate_fitness(&self, path: &[usize]) -> Option<f64> {
        if path.is_empty() {
            return Some(0.0);
        }
        if !self.is_path_valid(path) {
            return None;
        }
        path.windows(2)
            .map(|w| self.get_weight(w[0], w[1]).ok())
            .sum()
    }

    /// Scales every pheromone by `1 - rate`.
    pub fn evaporate_pheromones(&mut self, rate: f64) -> GraphResult<()> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(GraphError::InvalidEvaporationRate { rate });
        }
        let factor = 1.0 - rate;
        for edges in self.adjacency.iter_mut().flatten() {
            for edge in edges.values_mut() {
                edge.pheromone *= factor;
            }
        }
        Ok(())
    }
}
