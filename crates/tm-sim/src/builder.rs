//! Fluent builder for constructing a [`Model`].

use log::debug;
use rand_distr::Poisson;

use tm_core::{Parameters, PersonId, SimRng, Tick};
use tm_disease::{
    AdherenceAssigner, AgeBinMortality, ArtLagCalculator, CondomUseAssigner, PrepUptake, StageMap,
    TransmissionRunner, ViralLoadCalculator, ViralLoadSlopeCalculator,
};
use tm_network::{ContactNetwork, EdgeType};
use tm_person::{Person, PersonCreator, Population};
use tm_schedule::{ArtScheduler, EventQueue};

use crate::dynamics::add_edge;
use crate::model::{Action, IdSet};
use crate::{
    Model, ModelConfig, NetworkDynamics, NetworkSnapshot, SaveAt, SimError, SimResult,
    StaticNetwork, TickCounts,
};

/// Fluent builder for [`Model<D>`].
///
/// # Inputs
///
/// | Method             | Default                                      |
/// |--------------------|----------------------------------------------|
/// | `.snapshot(s)`     | none; persons and edges restored at tick 0   |
/// | `.persons(v)`      | none; persons inserted as given              |
/// | `.edge(a, b, k)`   | none; edges between any of the above         |
/// | `.dynamics(d)`     | [`StaticNetwork`]                            |
///
/// Snapshot persons come first, then explicit persons, then snapshot edges,
/// then explicit edges.  Snapshot persons on ART without an adherence
/// category draw one, and every edge draws its condom-use category, from the
/// model stream in that order.
///
/// # Example
///
/// ```rust,ignore
/// let config = ModelConfig::from_parameters(&params)?;
/// let mut model = ModelBuilder::new(config)
///     .snapshot(&snapshot)
///     .build()?;
/// model.run(&mut NoopRecorder)?;
/// ```
pub struct ModelBuilder<D: NetworkDynamics = StaticNetwork> {
    config:    ModelConfig,
    snapshot:  Option<NetworkSnapshot>,
    persons:   Vec<Person>,
    edges:     Vec<(PersonId, PersonId, EdgeType)>,
    dynamics:  D,
}

impl ModelBuilder<StaticNetwork> {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            snapshot: None,
            persons:  Vec::new(),
            edges:    Vec::new(),
            dynamics: StaticNetwork,
        }
    }

    /// Parse `params` into a [`ModelConfig`] and start a builder from it.
    pub fn from_parameters(params: &Parameters) -> SimResult<Self> {
        Ok(Self::new(ModelConfig::from_parameters(params)?))
    }
}

impl<D: NetworkDynamics> ModelBuilder<D> {
    /// Seed the population and network from an exported snapshot.
    pub fn snapshot(mut self, snapshot: &NetworkSnapshot) -> Self {
        self.snapshot = Some(snapshot.clone());
        self
    }

    /// Add persons as they are.  Ids must not collide with snapshot ids.
    pub fn persons(mut self, persons: impl IntoIterator<Item = Person>) -> Self {
        self.persons.extend(persons);
        self
    }

    pub fn edge(mut self, v1: PersonId, v2: PersonId, kind: EdgeType) -> Self {
        self.edges.push((v1, v2, kind));
        self
    }

    pub fn edges(mut self, edges: impl IntoIterator<Item = (PersonId, PersonId, EdgeType)>) -> Self {
        self.edges.extend(edges);
        self
    }

    /// Replace the network dynamics.
    pub fn dynamics<E: NetworkDynamics>(self, dynamics: E) -> ModelBuilder<E> {
        ModelBuilder {
            config:   self.config,
            snapshot: self.snapshot,
            persons:  self.persons,
            edges:    self.edges,
            dynamics,
        }
    }

    /// Validate every calculator, load the initial population and network,
    /// and schedule the run.
    pub fn build(self) -> SimResult<Model<D>> {
        let config = self.config;
        let mut rng = SimRng::new(config.run.seed);

        // ── Calculators ───────────────────────────────────────────────────
        let mut creator = PersonCreator::new(config.persons)?;
        let transmission = TransmissionRunner::new(config.transmission.clone());
        let cd4 = config.cd4.clone();
        let viral_load = ViralLoadCalculator::new(config.viral_load);
        let vl_slope = ViralLoadSlopeCalculator {
            undetectable_viral_load: config.viral_load.undetectable_viral_load,
            time_to_full_supp:       config.viral_load.time_to_full_supp,
        };
        let s = config.stages;
        let stages = StageMap::new(
            s.acute_max,
            s.chronic_max,
            s.acute_mult,
            s.late_mult,
            s.baseline_infectivity,
            s.vl_increment,
        )?;
        let prep = PrepUptake::new(config.prep.daily_stop_prob, config.prep.coverage)?;
        let art_lag = ArtLagCalculator::new(config.art_lag.clone())?;
        let adherence = AdherenceAssigner::new(config.adherence)?;
        let condoms = CondomUseAssigner::new(config.condoms)?;
        let mortality = AgeBinMortality::new(config.mortality.clone())?;
        let rate = config.demography.daily_entry_rate;
        let entry_dist = if rate > 0.0 {
            Some(Poisson::new(rate).map_err(|e| SimError::Config(format!("daily.entry.rate {rate}: {e}")))?)
        } else {
            None
        };

        // ── Persons ───────────────────────────────────────────────────────
        let mut population = Population::new();
        let mut network = ContactNetwork::new();
        let mut snapshot_edges = Vec::new();

        if let Some(snapshot) = &self.snapshot {
            let index = snapshot.index_map()?;
            let mut ids = Vec::with_capacity(snapshot.persons.len());
            for snap in &snapshot.persons {
                let mut person = creator.from_snapshot(snap, 0.0, |age| transmission.dur_inf_by_age(age))?;
                if person.adherence.is_assigned() {
                    person.adherence = adherence.record_for(person.adherence.category);
                } else if person.is_on_art() {
                    person.adherence = adherence.assign(&mut rng);
                }
                ids.push(person.id);
                network.add_vertex(person.id)?;
                population.insert(person);
            }
            for e in &snapshot.edges {
                let endpoint = |vertex: u32| {
                    index.get(&vertex).map(|&pos| ids[pos]).ok_or_else(|| {
                        SimError::Config(format!("snapshot edge refers to unknown vertex {vertex}"))
                    })
                };
                snapshot_edges.push((endpoint(e.v1)?, endpoint(e.v2)?, e.kind));
            }
        }

        for person in self.persons {
            creator.reserve(person.id);
            network.add_vertex(person.id)?;
            population.insert(person);
        }

        // ── Edges ─────────────────────────────────────────────────────────
        for (v1, v2, kind) in snapshot_edges.into_iter().chain(self.edges) {
            add_edge(&mut network, &population, &condoms, &mut rng, v1, v2, kind)?;
        }

        // ── Biomarker sample ──────────────────────────────────────────────
        let ids = population.ids();
        let wanted = config.run.biomarker_log_count.min(ids.len());
        let mut biomarkers = IdSet::default();
        while biomarkers.len() < wanted {
            biomarkers.insert(ids[rng.gen_range(0..ids.len())]);
        }

        // ── Schedule ──────────────────────────────────────────────────────
        let mut queue = EventQueue::new();
        for at in &config.run.save_network_at {
            if let SaveAt::Tick(t) = *at {
                queue.push(Tick(t + 0.1), Action::Snapshot);
            }
        }
        if config.run.stop_at >= 1.0 {
            queue.push(Tick(1.0), Action::Step);
        }
        let window = adherence.window_length();
        for person in population.iter() {
            if person.is_on_prep() {
                let stop_time = person.prep.stop_time;
                queue.push(Tick(stop_time), Action::PrepCessation { person: person.id, stop_time });
            }
            if person.is_on_art() && person.adherence.is_assigned() {
                queue.push(Tick(window - 0.1), Action::AdherenceCheck(person.id));
            }
        }

        debug!(
            "model built: {} persons, {} edges, {} actions scheduled",
            population.len(),
            network.total_edge_count(),
            queue.len()
        );

        Ok(Model {
            current_size: network.vertex_count(),
            config,
            population,
            network,
            dynamics: self.dynamics,
            rng,
            queue,
            art: ArtScheduler::new(),
            counts: TickCounts::default(),
            biomarkers,
            theta: [0.0; 2],
            now: Tick::ZERO,
            started: false,
            finished: false,
            creator,
            transmission,
            cd4,
            viral_load,
            vl_slope,
            stages,
            prep,
            art_lag,
            adherence,
            condoms,
            mortality,
            entry_dist,
        })
    }
}
