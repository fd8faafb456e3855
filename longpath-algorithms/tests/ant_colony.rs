use longpath_algorithms::longest_path::ant_colony::*;
use longpath_challenges::longest_path::{Challenge, Difficulty, Graph, GraphError, Solution};
use serde_json::json;
use std::{cell::RefCell, collections::BTreeMap, io};

fn triangle() -> Graph {
    let mut graph = Graph::new();
    graph.add_edge(1, 2, 5.0).unwrap();
    graph.add_edge(2, 3, 7.0).unwrap();
    graph.add_edge(1, 3, 1.0).unwrap();
    graph
}

fn chain() -> Graph {
    let mut graph = Graph::new();
    graph.add_edge(1, 2, 5.0).unwrap();
    graph.add_edge(2, 3, 7.0).unwrap();
    graph
}

fn params(iterations: usize, num_ants: usize, evaporation_rate: f64) -> Hyperparameters {
    Hyperparameters {
        iterations,
        num_ants,
        evaporation_rate,
        seed: 1,
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_select_single_candidate() {
    let mut rng = RandomSource::new(5);
    let weights = BTreeMap::from([(4usize, 0.3)]);
    for _ in 0..100 {
        assert_eq!(select(&mut rng, &weights), Some(4));
    }
}

#[test]
fn test_select_without_candidates() {
    let mut rng = RandomSource::new(5);
    assert_eq!(select(&mut rng, &BTreeMap::<usize, f64>::new()), None);
    assert_eq!(select(&mut rng, &BTreeMap::from([(1usize, 0.0), (2, 0.0)])), None);
    assert_eq!(select(&mut rng, &BTreeMap::from([(1usize, -1.0), (2, 3.0)])), None);
}

#[test]
fn test_select_skips_zero_weights() {
    let mut rng = RandomSource::new(11);
    let weights = BTreeMap::from([(1usize, 0.0), (2, 1.0), (3, 0.0)]);
    for _ in 0..100 {
        assert_eq!(select(&mut rng, &weights), Some(2));
    }
}

#[test]
fn test_select_is_reproducible() {
    let weights = BTreeMap::from([(1usize, 1.0), (2, 2.0), (3, 3.0), (4, 4.0)]);
    let draws = |seed: u64| -> Vec<usize> {
        let mut rng = RandomSource::new(seed);
        (0..50)
            .map(|_| select(&mut rng, &weights).unwrap())
            .collect()
    };
    assert_eq!(draws(42), draws(42));
}

#[test]
fn test_select_follows_weights() {
    let mut rng = RandomSource::new(3);
    let weights = BTreeMap::from([(1usize, 1.0), (2, 9.0)]);
    let heavy = (0..2000)
        .filter(|_| select(&mut rng, &weights) == Some(2))
        .count();
    assert!(heavy > 1600 && heavy < 1990, "heavy drawn {} times", heavy);
}

#[test]
fn test_calculate_probabilities() {
    let mut graph = triangle();
    let probabilities = calculate_probabilities(&graph, 1).unwrap().unwrap();
    assert_eq!(probabilities.keys().cloned().collect::<Vec<_>>(), vec![2, 3]);
    assert_close(probabilities.values().sum::<f64>(), 1.0);
    assert_close(probabilities[&2], 5.0 / 6.0);
    assert_close(probabilities[&3], 1.0 / 6.0);

    graph
        .set_pheromone(1, 3, graph.get_pheromone(1, 3).unwrap() + PHEROMONE_INCREMENT)
        .unwrap();
    let reinforced = calculate_probabilities(&graph, 1).unwrap().unwrap();
    assert!(reinforced[&3] > probabilities[&3]);
    assert_close(reinforced[&3], 4.0 / 9.0);
}

#[test]
fn test_calculate_probabilities_dead_ends() {
    let mut graph = triangle();
    assert_eq!(calculate_probabilities(&graph, 3).unwrap(), None);
    assert_eq!(
        calculate_probabilities(&graph, 9),
        Err(GraphError::VertexNotFound { vertex: 9 })
    );
    graph.set_pheromone(1, 2, 0.0).unwrap();
    graph.set_pheromone(1, 3, 0.0).unwrap();
    assert_eq!(calculate_probabilities(&graph, 1).unwrap(), None);
}

#[test]
fn test_generate_path_on_triangle() {
    let graph = triangle();
    for seed in 0..50 {
        let mut rng = RandomSource::new(seed);
        let path = PathBuilder::new(&graph, &mut rng)
            .generate_path(1, 3)
            .unwrap()
            .unwrap();
        assert!(path == vec![1, 2, 3] || path == vec![1, 3], "{:?}", path);
        assert!(graph.is_path_valid(&path));
        let fitness = graph.calculate_fitness(&path).unwrap();
        assert!(fitness == 12.0 || fitness == 1.0);
    }
}

#[test]
fn test_generate_path_source_is_destination() {
    let graph = triangle();
    let mut rng = RandomSource::new(0);
    let path = PathBuilder::new(&graph, &mut rng).generate_path(2, 2).unwrap();
    assert_eq!(path, Some(vec![2]));
}

#[test]
fn test_generate_path_dead_end() {
    let mut graph = Graph::new();
    graph.add_edge(1, 2, 4.0).unwrap();
    graph.add_edge(3, 1, 4.0).unwrap();
    let mut rng = RandomSource::new(0);
    assert_eq!(
        PathBuilder::new(&graph, &mut rng).generate_path(1, 3).unwrap(),
        None
    );
}

#[test]
fn test_generate_path_gives_up_on_cycles() {
    // 1 <-> 2 with the destination unreachable: every draw at 2 revisits 1
    let mut graph = Graph::new();
    graph.add_edge(1, 2, 1.0).unwrap();
    graph.add_edge(2, 1, 1.0).unwrap();
    graph.create_vertex(3).unwrap();
    let mut rng = RandomSource::new(0);
    assert_eq!(
        PathBuilder::new(&graph, &mut rng).generate_path(1, 3).unwrap(),
        None
    );
}

#[test]
fn test_generate_path_redraw_budget() {
    let mut graph = Graph::new();
    graph.add_edge(1, 2, 1.0).unwrap();
    graph.add_edge(2, 1, 1.0).unwrap();
    graph.create_vertex(3).unwrap();
    let mut rng = RandomSource::new(4);
    assert_eq!(
        PathBuilder::new(&graph, &mut rng).generate_path(1, 3).unwrap(),
        None
    );
    // one draw at 1, then one draw plus 3 redraws at 2 before giving up
    let mut expected = RandomSource::new(4);
    for _ in 0..5 {
        expected.gen_below(1.0);
    }
    assert_eq!(rng.gen_below(1.0), expected.gen_below(1.0));
}

#[test]
fn test_generate_path_unknown_vertex() {
    let graph = triangle();
    let mut rng = RandomSource::new(0);
    assert_eq!(
        PathBuilder::new(&graph, &mut rng).generate_path(1, 8),
        Err(GraphError::VertexNotFound { vertex: 8 })
    );
}

#[test]
fn test_single_ant_single_iteration_on_unique_path() {
    let mut graph = chain();
    let mut colony = Colony::new(&mut graph, params(1, 1, 0.1)).unwrap();
    let result = colony.optimize(&mut io::sink()).unwrap();
    assert_eq!(result.path, vec![1, 2, 3]);
    assert_eq!(result.best_fitness, 12.0);
    assert_eq!(result.avg_fitness, 12.0);
    assert_eq!(colony.state(), ColonyState::Done);
}

#[test]
fn test_best_path_is_reinforced_twice() {
    let mut graph = chain();
    let mut colony = Colony::new(&mut graph, params(1, 1, 0.0)).unwrap();
    colony.optimize(&mut io::sink()).unwrap();
    assert_eq!(graph.get_pheromone(1, 2).unwrap(), 1.0 + 2.0 * PHEROMONE_INCREMENT);
    assert_eq!(graph.get_pheromone(2, 3).unwrap(), 1.0 + 2.0 * PHEROMONE_INCREMENT);
}

#[test]
fn test_every_ant_reinforces_its_path() {
    let mut graph = chain();
    let mut colony = Colony::new(&mut graph, params(1, 4, 0.5)).unwrap();
    colony.optimize(&mut io::sink()).unwrap();
    // four ant deposits plus the best path deposit, then halved
    let expected = (1.0 + 5.0 * PHEROMONE_INCREMENT) * 0.5;
    assert_close(graph.get_pheromone(1, 2).unwrap(), expected);
    assert_close(graph.get_pheromone(2, 3).unwrap(), expected);
}

#[test]
fn test_build_solution_returns_iteration_best() {
    let mut graph = chain();
    let mut colony = Colony::new(&mut graph, params(1, 3, 0.1)).unwrap();
    let (path, fitness) = colony.build_solution().unwrap();
    assert_eq!(path, vec![1, 2, 3]);
    assert_eq!(fitness, 12.0);
}

#[test]
fn test_progress_log() {
    let mut graph = chain();
    let mut log = Vec::new();
    let mut colony = Colony::new(&mut graph, params(3, 2, 0.1)).unwrap();
    let result = colony.optimize(&mut log).unwrap();
    assert_eq!(String::from_utf8(log).unwrap(), "1,12,12\n2,12,12\n3,12,12\n");
    assert_eq!(result.history.len(), 3);
    assert_eq!(result.history[2].to_string(), "3,12,12");
}

#[test]
fn test_iterations_without_paths() {
    let mut graph = Graph::new();
    graph.add_edge(1, 2, 4.0).unwrap();
    graph.add_edge(3, 1, 4.0).unwrap();
    let mut log = Vec::new();
    let mut colony = Colony::new(&mut graph, params(2, 3, 0.1)).unwrap();
    let result = colony.optimize(&mut log).unwrap();
    assert!(result.path.is_empty());
    assert_eq!(result.best_fitness, 0.0);
    assert_eq!(result.avg_fitness, 0.0);
    assert_eq!(String::from_utf8(log).unwrap(), "1,0,0\n2,0,0\n");
}

#[test]
fn test_colony_runs_once() {
    let mut graph = chain();
    let mut colony = Colony::new(&mut graph, params(1, 1, 0.1)).unwrap();
    assert_eq!(colony.state(), ColonyState::Idle);
    colony.optimize(&mut io::sink()).unwrap();
    assert!(colony.optimize(&mut io::sink()).is_err());
}

#[test]
fn test_missing_source_vertex_is_an_error() {
    let mut graph = Graph::new();
    graph.add_edge(2, 3, 1.0).unwrap();
    let mut colony = Colony::new(&mut graph, params(1, 1, 0.1)).unwrap();
    assert!(colony.optimize(&mut io::sink()).is_err());
}

#[test]
fn test_invalid_hyperparameters() {
    let mut graph = chain();
    assert!(Colony::new(&mut graph, params(0, 1, 0.1)).is_err());
    assert!(Colony::new(&mut graph, params(1, 0, 0.1)).is_err());
    assert!(Colony::new(&mut graph, params(1, 1, 1.5)).is_err());
    assert!(Colony::new(&mut graph, params(1, 1, -0.1)).is_err());
    assert!(Colony::new(&mut graph, params(1, 1, 1.0)).is_ok());
}

#[test]
fn test_hyperparameters_from_map() {
    assert_eq!(Hyperparameters::from_map(&None).unwrap(), Hyperparameters::default());

    let map = json!({ "num_ants": 4, "seed": 9 }).as_object().cloned();
    let parsed = Hyperparameters::from_map(&map).unwrap();
    assert_eq!(parsed.num_ants, 4);
    assert_eq!(parsed.seed, 9);
    assert_eq!(parsed.iterations, 100);
    assert_eq!(parsed.evaporation_rate, 0.1);

    let map = json!({ "evaporation_rate": 2.0 }).as_object().cloned();
    assert!(Hyperparameters::from_map(&map).is_err());
    let map = json!({ "iterations": -3 }).as_object().cloned();
    assert!(Hyperparameters::from_map(&map).is_err());
}

fn generated_challenge() -> Challenge {
    Challenge::generate_instance(
        &[9; 32],
        &Difficulty {
            num_vertices: 25,
            num_extra_edges: 60,
        },
    )
    .unwrap()
}

#[test]
fn test_optimize_is_reproducible() {
    let challenge = generated_challenge();
    let run = || {
        let mut graph = challenge.graph.clone();
        let mut colony = Colony::new(&mut graph, params(20, 5, 0.2)).unwrap();
        colony.optimize(&mut io::sink()).unwrap()
    };
    let first = run();
    let second = run();
    assert_eq!(first.path, second.path);
    assert_eq!(first.history, second.history);
}

#[test]
fn test_optimize_on_generated_instance() {
    let challenge = generated_challenge();
    let mut graph = challenge.graph.clone();
    let mut colony = Colony::new(&mut graph, params(30, 8, 0.3)).unwrap();
    let result = colony.optimize(&mut io::sink()).unwrap();

    assert!(!result.path.is_empty());
    assert_eq!(result.path[0], 1);
    assert_eq!(*result.path.last().unwrap(), 25);
    assert!(graph.is_path_valid(&result.path));
    assert_eq!(graph.calculate_fitness(&result.path), Some(result.best_fitness));
    assert!(result.best_fitness >= result.avg_fitness);
    for window in result.history.windows(2) {
        assert!(window[1].best_fitness >= window[0].best_fitness);
    }
    for (_, _, edge) in graph.edges() {
        assert!(edge.pheromone() >= 0.0);
    }
}

#[test]
fn test_solve_challenge_saves_valid_solution() {
    let challenge = generated_challenge();
    let saved = RefCell::new(None);
    let save_solution = |solution: &Solution| -> anyhow::Result<()> {
        *saved.borrow_mut() = Some(solution.clone());
        Ok(())
    };
    solve_challenge(&challenge, &save_solution, &json!({ "iterations": 20 }).as_object().cloned())
        .unwrap();
    let solution = saved.into_inner().unwrap();
    assert!(challenge.evaluate_solution(&solution).unwrap() > 0.0);
}

#[test]
fn test_generated_paths_are_valid() {
    let challenge = generated_challenge();
    let destination = challenge.destination();
    let mut found = 0;
    for seed in 0..10 {
        let mut rng = RandomSource::new(seed);
        let mut builder = PathBuilder::new(&challenge.graph, &mut rng);
        for _ in 0..50 {
            if let Some(path) = builder.generate_path(1, destination).unwrap() {
                assert_eq!(path[0], 1);
                assert_eq!(*path.last().unwrap(), destination);
                assert!(challenge.graph.is_path_valid(&path), "{:?}", path);
                found += 1;
            }
        }
    }
    assert!(found > 0);
}
