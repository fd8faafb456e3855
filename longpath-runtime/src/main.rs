use anyhow::{anyhow, Result};
use clap::{arg, Command};
use log::info;
use longpath_algorithms::longest_path::ant_colony::{Colony, Hyperparameters};
use longpath_challenges::longest_path::{Challenge, Difficulty, Solution};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::{Map, Value};
use std::{
    fs::{self, File},
    io::{self, BufWriter, Read, Write},
    path::PathBuf,
};

fn cli() -> Command {
    Command::new("longpath")
        .about("Searches for long simple paths in weighted digraphs with an ant colony")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("solve")
                .about("Runs the ant colony on a graph file")
                .arg(
                    arg!(--input <INPUT> "Graph file with one 'source<TAB>dest<TAB>weight' edge per line")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--output <OUTPUT> "Progress log file, one 'iteration,best,avg' line per iteration")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-n --ants [ANTS] "Number of ants in the colony")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(-i --iterations [ITERATIONS] "Number of colony iterations")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(-e --"evaporation-rate" [RATE] "Pheromone decay rate within [0, 1]")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    arg!(-s --seed [SEED] "Seed for reproducible runs")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--hyperparameters [HYPERPARAMETERS] "Hyperparameters json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--solution [SOLUTION_FILE] "If set, the best path will be saved to this file as json")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("verify")
                .about("Verifies a path against a graph file")
                .arg(
                    arg!(--input <INPUT> "Graph file with one 'source<TAB>dest<TAB>weight' edge per line")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(<SOLUTION> "Solution json string, path to json file, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                ),
        )
        .subcommand(
            Command::new("generate")
                .about("Generates a random graph with a path from vertex 1 to vertex N")
                .arg(
                    arg!(--vertices <VERTICES> "Number of vertices")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--edges <EDGES> "Number of edges on top of the 1 -> 2 -> .. -> N chain")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--seed [SEED] "Seed for instance generation")
                        .default_value("0")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--output [OUTPUT_FILE] "If set, the graph is written to this file instead of stdout")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let matches = cli().get_matches();

    if let Err(e) = match matches.subcommand() {
        Some(("solve", sub_m)) => solve(
            sub_m.get_one::<PathBuf>("input").unwrap().clone(),
            sub_m.get_one::<PathBuf>("output").unwrap().clone(),
            sub_m.get_one::<String>("hyperparameters").cloned(),
            HyperparameterOverrides {
                num_ants: sub_m.get_one::<usize>("ants").cloned(),
                iterations: sub_m.get_one::<usize>("iterations").cloned(),
                evaporation_rate: sub_m.get_one::<f64>("evaporation-rate").cloned(),
                seed: sub_m.get_one::<u64>("seed").cloned(),
            },
            sub_m.get_one::<PathBuf>("solution").cloned(),
        ),
        Some(("verify", sub_m)) => verify(
            sub_m.get_one::<PathBuf>("input").unwrap().clone(),
            sub_m.get_one::<String>("SOLUTION").unwrap().clone(),
        ),
        Some(("generate", sub_m)) => generate(
            *sub_m.get_one::<usize>("vertices").unwrap(),
            *sub_m.get_one::<usize>("edges").unwrap(),
            *sub_m.get_one::<u64>("seed").unwrap(),
            sub_m.get_one::<PathBuf>("output").cloned(),
        ),
        _ => Err(anyhow!("Invalid subcommand")),
    } {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

pub struct HyperparameterOverrides {
    num_ants: Option<usize>,
    iterations: Option<usize>,
    evaporation_rate: Option<f64>,
    seed: Option<u64>,
}

pub fn solve(
    input: PathBuf,
    output: PathBuf,
    hyperparameters: Option<String>,
    overrides: HyperparameterOverrides,
    solution_file: Option<PathBuf>,
) -> Result<()> {
    let mut params = match hyperparameters {
        Some(s) => serde_json::from_value::<Hyperparameters>(Value::Object(load_json_object(&s)?))
            .map_err(|e| anyhow!("Invalid hyperparameters: {}", e))?,
        None => Hyperparameters::default(),
    };
    if let Some(num_ants) = overrides.num_ants {
        params.num_ants = num_ants;
    }
    if let Some(iterations) = overrides.iterations {
        params.iterations = iterations;
    }
    if let Some(evaporation_rate) = overrides.evaporation_rate {
        params.evaporation_rate = evaporation_rate;
    }
    if let Some(seed) = overrides.seed {
        params.seed = seed;
    }

    let mut challenge = Challenge::load(&input)?;
    info!(
        "Loaded {} with {} vertices and {} edges",
        input.display(),
        challenge.graph.num_vertices(),
        challenge.graph.num_edges()
    );
    let log_file = File::create(&output)
        .map_err(|e| anyhow!("Failed to create log file {}: {}", output.display(), e))?;
    let mut progress = BufWriter::new(log_file);

    let mut colony = Colony::new(&mut challenge.graph, params)?;
    let result = colony.optimize(&mut progress)?;
    info!(
        "Wrote {} progress records to {}",
        result.history.len(),
        output.display()
    );

    let fitness = challenge
        .graph
        .calculate_fitness(&result.path)
        .ok_or_else(|| anyhow!("Best path {:?} is invalid", result.path))?;
    println!("{},{}", fitness, result.avg_fitness);

    if let Some(path) = solution_file {
        let solution = Solution { path: result.path };
        fs::write(&path, serde_json::to_string(&solution)?)
            .map_err(|e| anyhow!("Failed to write solution file {}: {}", path.display(), e))?;
        info!("Saved best path to {}", path.display());
    }
    Ok(())
}

pub fn verify(input: PathBuf, solution: String) -> Result<()> {
    let challenge = Challenge::load(&input)?;
    info!(
        "Loaded {} with {} vertices and {} edges",
        input.display(),
        challenge.graph.num_vertices(),
        challenge.graph.num_edges()
    );
    let solution = Solution::try_from(load_json_object(&solution)?)
        .map_err(|e| anyhow!("Invalid solution: {}", e))?;
    let fitness = challenge.evaluate_solution(&solution)?;
    println!("{}", fitness);
    Ok(())
}

pub fn generate(
    num_vertices: usize,
    num_extra_edges: usize,
    seed: u64,
    output_file: Option<PathBuf>,
) -> Result<()> {
    let seed: [u8; 32] = StdRng::seed_from_u64(seed).gen();
    let challenge = Challenge::generate_instance(
        &seed,
        &Difficulty {
            num_vertices,
            num_extra_edges,
        },
    )?;
    info!(
        "Generated instance with {} vertices and {} edges",
        challenge.graph.num_vertices(),
        challenge.graph.num_edges()
    );
    match output_file {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(&path)?);
            challenge.write_edge_list(&mut writer)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            challenge.write_edge_list(&mut writer)?;
        }
    }
    Ok(())
}

fn load_json_object(s: &str) -> Result<Map<String, Value>> {
    let json = if s == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else if s.ends_with(".json") {
        fs::read_to_string(s).map_err(|e| anyhow!("Failed to read json file {}: {}", s, e))?
    } else {
        s.to_string()
    };
    match serde_json::from_str::<Value>(&json)? {
        Value::Object(map) => Ok(map),
        _ => Err(anyhow!("Expecting a json object")),
    }
}
