//! small — a two-year run of the transmission model on a synthetic population.
//!
//! 600 persons aged 18 to 65, 5% of them infected at the start, connected by
//! a random steady and casual network that churns every day.  Output lands in
//! `./output` (or the directory given as the second argument) as CSV files,
//! with network snapshots at day 365 and at the end.
//!
//! ```text
//! cargo run -p small --release [model.props] [output-dir]
//! ```
//!
//! Log verbosity follows `TM_LOG` (`error` … `trace`, default `info`).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use log::{LevelFilter, info};
use log4rs::Config;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;

use tm_core::{EdgeId, Parameters, PersonId, SimRng};
use tm_disease::TransmissionRunner;
use tm_network::EdgeType;
use tm_output::{CsvWriter, OutputRecorder};
use tm_person::{Person, PersonCreator};
use tm_sim::{EdgeEditor, ModelBuilder, ModelConfig, NetworkDynamics, SimResult};

// ── Constants ─────────────────────────────────────────────────────────────────

const POPULATION:         usize = 600;
const POPULATION_SEED:    u64   = 2024;
const INITIAL_PREVALENCE: f64   = 0.05;
/// Mean partnerships per person at the start, by `EdgeType::index`.
const MEAN_DEGREE:        [f64; 2] = [0.4, 0.3];
/// Daily dissolution probability, by `EdgeType::index`.
const DISSOLUTION:        [f64; 2] = [1.0 / 365.0, 1.0 / 30.0];

const DEFAULT_PROPS: &str = include_str!("../model.props");
const LOG_PATTERN:   &str = "{d(%Y-%m-%dT%H:%M:%SZ)} {h({l})} {t} - {m}{n}";

// ── Logging ───────────────────────────────────────────────────────────────────

fn init_logging() -> Result<()> {
    let level = std::env::var("TM_LOG")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(LevelFilter::Info);
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))?;
    log4rs::init_config(config)?;
    Ok(())
}

// ── Network dynamics ──────────────────────────────────────────────────────────

/// Random churn: every edge dissolves with a fixed daily probability and
/// dissolved edges are replaced between uniformly chosen pairs, so the mean
/// degree holds steady.  Formation is scaled by `exp(theta)`, which shrinks
/// it as the population grows and raises it as the population shrinks.
struct RandomChurn {
    theta: [f64; 2],
}

impl RandomChurn {
    fn new() -> Self {
        Self { theta: [0.0; 2] }
    }
}

impl NetworkDynamics for RandomChurn {
    fn update(&mut self, _tick: f64, editor: &mut EdgeEditor<'_>) -> SimResult<()> {
        let people: Vec<PersonId> = editor.network().vertices().collect();
        if people.len() < 2 {
            return Ok(());
        }

        for kind in EdgeType::ALL {
            let k = kind.index();
            let ids: Vec<EdgeId> = editor.network().edges_of_type(kind).map(|e| e.id).collect();
            let mut dissolved = 0;
            for id in ids {
                if editor.rng().bernoulli(DISSOLUTION[k]) {
                    editor.remove_edge(id)?;
                    dissolved += 1;
                }
            }

            let target = MEAN_DEGREE[k] * people.len() as f64 / 2.0 * self.theta[k].exp();
            let missing = (target - editor.network().edge_count(kind) as f64).max(0.0);
            let wanted = dissolved.max(missing.round() as usize);
            for _ in 0..wanted {
                let a = people[editor.rng().gen_range(0..people.len())];
                let b = people[editor.rng().gen_range(0..people.len())];
                let net = editor.network();
                if a != b && !net.has_edge(a, b, kind) && !net.has_edge(b, a, kind) {
                    editor.add_edge(a, b, kind)?;
                }
            }
        }
        Ok(())
    }

    fn adjust_theta(&mut self, kind: EdgeType, delta: f64) {
        self.theta[kind.index()] += delta;
    }
}

// ── Initial population ────────────────────────────────────────────────────────

fn initial_population(config: &ModelConfig, rng: &mut SimRng) -> Result<Vec<Person>> {
    let mut creator = PersonCreator::new(config.persons)?;
    let transmission = TransmissionRunner::new(config.transmission.clone());
    let (min_age, max_age) = (config.demography.min_age, config.demography.max_age);

    Ok((0..POPULATION)
        .map(|_| {
            let age = rng.uniform_between(min_age, max_age);
            let mut person = creator.create(0.0, age, rng);
            if rng.bernoulli(INITIAL_PREVALENCE) {
                let since = rng.uniform_between(0.0, 1_000.0).floor();
                person.infect(transmission.dur_inf_by_age(age), -since);
                person.infection.time_since_infection = since;
            }
            person
        })
        .collect())
}

fn initial_edges(persons: &[Person], rng: &mut SimRng) -> Vec<(PersonId, PersonId, EdgeType)> {
    let mut seen = BTreeSet::new();
    for kind in EdgeType::ALL {
        let count = (MEAN_DEGREE[kind.index()] * persons.len() as f64 / 2.0) as usize;
        while seen.iter().filter(|&&(_, _, k)| k == kind).count() < count {
            let a = persons[rng.gen_range(0..persons.len())].id;
            let b = persons[rng.gen_range(0..persons.len())].id;
            if a != b {
                seen.insert((a.min(b), a.max(b), kind));
            }
        }
    }
    seen.into_iter().collect()
}

// ── main ──────────────────────────────────────────────────────────────────────

fn load_parameters(path: Option<&Path>) -> Result<Parameters> {
    match path {
        Some(path) => Parameters::from_path(path).with_context(|| format!("reading {}", path.display())),
        None => Ok(Parameters::from_properties_str(DEFAULT_PROPS)?),
    }
}

fn main() -> Result<()> {
    init_logging()?;
    let args: Vec<String> = std::env::args().collect();
    let props = args.get(1).map(PathBuf::from);
    let out_dir = args.get(2).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("output"));

    println!("=== small — HIV transmission model ===");
    println!("Persons: {POPULATION}  |  Initial prevalence: {INITIAL_PREVALENCE}");
    println!();

    // 1. Parameters.
    let params = load_parameters(props.as_deref())?;
    let config = ModelConfig::from_parameters(&params)?;
    println!("Run length: {} ticks, seed {}", config.run.stop_at, config.run.seed);

    // 2. Synthetic population and network, drawn from their own stream.
    let mut rng = SimRng::new(POPULATION_SEED);
    let persons = initial_population(&config, &mut rng)?;
    let edges = initial_edges(&persons, &mut rng);
    let infected = persons.iter().filter(|p| p.is_infected()).count();
    println!("Population: {} persons, {infected} infected, {} edges", persons.len(), edges.len());

    // 3. Model.
    let mut model = ModelBuilder::new(config)
        .persons(persons)
        .edges(edges)
        .dynamics(RandomChurn::new())
        .build()?;

    // 4. Output.
    std::fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    let mut recorder = OutputRecorder::new(CsvWriter::new(&out_dir)?);

    // 5. Run.
    let t0 = Instant::now();
    model.run(&mut recorder)?;
    let elapsed = t0.elapsed();
    if let Some(e) = recorder.take_error() {
        return Err(e).context("writing output");
    }

    let alive = model.population.len();
    let infected = model.population.iter().filter(|p| p.is_infected()).count();
    let on_art = model.population.iter().filter(|p| p.is_on_art()).count();
    let on_prep = model.population.iter().filter(|p| p.is_on_prep()).count();
    info!("output written to {}", out_dir.display());

    println!();
    println!("=== Done in {:.2?} ===", elapsed);
    println!("Alive: {alive}  |  Infected: {infected}  |  On ART: {on_art}  |  On PrEP: {on_prep}");
    println!("Output: {}", out_dir.display());
    Ok(())
}
