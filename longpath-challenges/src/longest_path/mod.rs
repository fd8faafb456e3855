mod graph;
pub use graph::*;

use anyhow::{anyhow, Result};
use logging_timer::time;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::{from_value, Map, Value};
use std::{
    fs::File,
    io::{BufRead, BufReader, Write},
    path::Path,
};

pub const SOURCE_VERTEX: usize = 1;

#[derive(Serialize, Deserialize, Debug, Copy, Clone)]
pub struct Difficulty {
    pub num_vertices: usize,
    pub num_extra_edges: usize,
}

impl From<Vec<i32>> for Difficulty {
    fn from(arr: Vec<i32>) -> Self {
        Self {
            num_vertices: arr[0] as usize,
            num_extra_edges: arr[1] as usize,
        }
    }
}

impl Into<Vec<i32>> for Difficulty {
    fn into(self) -> Vec<i32> {
        vec![self.num_vertices as i32, self.num_extra_edges as i32]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Solution {
    pub path: Vec<usize>,
}

impl Solution {
    pub fn new() -> Self {
        Self { path: Vec::new() }
    }
}

impl TryFrom<Map<String, Value>> for Solution {
    type Error = serde_json::Error;

    fn try_from(v: Map<String, Value>) -> Result<Self, Self::Error> {
        from_value(Value::Object(v))
    }
}

/// A longest path instance: find a heavy simple path from vertex `1` to
/// vertex `N`, where `N` is the number of vertices.
#[derive(Debug, Clone)]
pub struct Challenge {
    pub graph: Graph,
}

impl Challenge {
    pub fn from_graph(graph: Graph) -> Self {
        Self { graph }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| anyhow!("Failed to open graph file {}: {}", path.display(), e))?;
        Ok(Self::from_graph(read_edge_list(BufReader::new(file))?))
    }

    #[time]
    pub fn generate_instance(seed: &[u8; 32], difficulty: &Difficulty) -> Result<Self> {
        let num_vertices = difficulty.num_vertices;
        if num_vertices < 2 {
            return Err(anyhow!("Number of vertices must be at least 2"));
        }
        let max_extra_edges = num_vertices * (num_vertices - 1) - (num_vertices - 1);
        if difficulty.num_extra_edges > max_extra_edges {
            return Err(anyhow!(
                "Number of extra edges ({}) exceeds the maximum ({}) for {} vertices",
                difficulty.num_extra_edges,
                max_extra_edges,
                num_vertices
            ));
        }
        let mut rng = SmallRng::from_seed(seed.clone());
        let mut graph = Graph::new();

        // Backbone chain 1 -> 2 -> .. -> N keeps the destination reachable
        for vertex in 1..num_vertices {
            graph.add_edge(vertex, vertex + 1, rng.gen_range(1..=100) as f64)?;
        }

        let mut added = 0;
        while added < difficulty.num_extra_edges {
            let source = rng.gen_range(1..=num_vertices);
            let dest = rng.gen_range(1..=num_vertices);
            if source == dest || graph.contains_edge(source, dest) {
                continue;
            }
            graph.add_edge(source, dest, rng.gen_range(1..=100) as f64)?;
            added += 1;
        }

        Ok(Self { graph })
    }

    pub fn source(&self) -> usize {
        SOURCE_VERTEX
    }

    pub fn destination(&self) -> usize {
        self.graph.num_vertices()
    }

    pub fn write_edge_list<W: Write>(&self, writer: &mut W) -> Result<()> {
        for (source, dest, edge) in self.graph.edges() {
            writeln!(writer, "{}\t{}\t{}", source, dest, edge.weight())?;
        }
        Ok(())
    }

    conditional_pub!(
        fn evaluate_solution(&self, solution: &Solution) -> Result<f64> {
            let path = &solution.path;
            if path.first() != Some(&self.source()) {
                return Err(anyhow!(
                    "Path must start at vertex {}. Actual: {:?}",
                    self.source(),
                    path.first()
                ));
            }
            if path.last() != Some(&self.destination()) {
                return Err(anyhow!(
                    "Path must end at vertex {}. Actual: {:?}",
                    self.destination(),
                    path.last()
                ));
            }
            self.graph
                .calculate_fitness(path)
                .ok_or_else(|| anyhow!("Path {:?} is not a valid simple path", path))
        }
    );

    conditional_pub!(
        fn verify_solution(&self, solution: &Solution) -> Result<()> {
            let fitness = self.evaluate_solution(solution)?;
            println!(
                "Path of {} vertices is valid (fitness: {})",
                solution.path.len(),
                fitness
            );
            Ok(())
        }
    );
}

/// Reads `source\tdest\tweight` lines into a graph, adding edges in file
/// order. Blank lines are skipped.
pub fn read_edge_list<R: BufRead>(reader: R) -> Result<Graph> {
    let mut graph = Graph::new();
    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        if fields.len() != 3 {
            return Err(anyhow!(
                "Line {}: expected 3 tab separated fields, found {}",
                line_no,
                fields.len()
            ));
        }
        let source = fields[0]
            .parse::<usize>()
            .map_err(|e| anyhow!("Line {}: invalid source vertex '{}': {}", line_no, fields[0], e))?;
        let dest = fields[1]
            .parse::<usize>()
            .map_err(|e| anyhow!("Line {}: invalid dest vertex '{}': {}", line_no, fields[1], e))?;
        let weight = fields[2]
            .parse::<f64>()
            .map_err(|e| anyhow!("Line {}: invalid weight '{}': {}", line_no, fields[2], e))?;
        graph
            .add_edge(source, dest, weight)
            .map_err(|e| anyhow!("Line {}: {}", line_no, e))?;
    }
    Ok(graph)
}
