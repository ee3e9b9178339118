//! The `Model` struct, its event loop, and the per-tick pipeline.

use log::{debug, info, warn};
use rand_distr::Poisson;

use tm_core::{PersonId, SimRng, Tick};
use tm_disease::{
    AdherenceAssigner, AgeBinMortality, ArtLagCalculator, CauseOfDeath, Cd4Calculator,
    CondomUseAssigner, PrepUptake, StageMap, TransmissionRunner, ViralLoadCalculator,
    ViralLoadSlopeCalculator,
};
use tm_network::{ContactNetwork, EdgeType};
use tm_person::{PersonCreator, Population, PrepStatus, TestResult};
use tm_schedule::{ArtScheduler, EventQueue};

use crate::{
    EdgeEditor, InfectionEvent, InfectionSource, ModelConfig, NetworkDynamics, NetworkSnapshot,
    PartnerState, Recorder, SaveAt, SimError, SimResult, StaticNetwork, TickCounts,
};

#[cfg(feature = "fx-hash")]
pub(crate) type IdSet = rustc_hash::FxHashSet<PersonId>;
#[cfg(not(feature = "fx-hash"))]
pub(crate) type IdSet = std::collections::HashSet<PersonId>;

/// Ticks between progress lines in the log.
const PROGRESS_EVERY: i64 = 100;

/// Entrants infected before entry were infected this many ticks earlier.
const ENTRY_INFECTION_LEAD_TICKS: f64 = 1.0;

// ── Scheduled actions ─────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Action {
    /// The whole-tick pipeline; reschedules itself one tick later.
    Step,
    /// Start ART for everyone batched under this initiation tick.
    ArtInit(Tick),
    /// End of one adherence window for an ART patient.
    AdherenceCheck(PersonId),
    /// End of a PrEP spell, if the spell is still the one that scheduled it.
    PrepCessation { person: PersonId, stop_time: f64 },
    Snapshot,
}

// ── Model ─────────────────────────────────────────────────────────────────────

/// The transmission model.
///
/// Holds the population, the contact network, every calculator, and the
/// event queue.  Create it via [`ModelBuilder`][crate::ModelBuilder] and
/// drive it with [`run`](Self::run).
///
/// Each whole tick `t` runs the step pipeline:
///
/// 1. **Network dynamics**: [`NetworkDynamics::update`].
/// 2. **Overlaps**: counted if `count.overlaps` is on.
/// 3. **Entries**: Poisson(`daily.entry.rate`) new persons, some infected.
/// 4. **Transmission**: one sex-act draw per edge; infections applied after
///    the pass.
/// 5. **Vitals**: disease progression, PrEP uptake, testing, ageing, and
///    mortality for every person; deaths removed after the pass.
/// 6. **External infections** among the uninfected survivors.
/// 7. **Theta**: formation terms corrected for the change in size.
/// 8. **Counts** handed to the recorder and reset.
pub struct Model<D: NetworkDynamics = StaticNetwork> {
    pub config:     ModelConfig,
    pub population: Population,
    pub network:    ContactNetwork,
    pub dynamics:   D,

    pub(crate) rng:          SimRng,
    pub(crate) queue:        EventQueue<Action>,
    pub(crate) art:          ArtScheduler,
    pub(crate) counts:       TickCounts,
    pub(crate) biomarkers:   IdSet,
    /// `[steady, casual]` accumulated formation-term corrections.
    pub(crate) theta:        [f64; 2],
    pub(crate) current_size: usize,
    pub(crate) now:          Tick,
    pub(crate) started:      bool,
    pub(crate) finished:     bool,

    pub(crate) creator:      PersonCreator,
    pub(crate) transmission: TransmissionRunner,
    pub(crate) cd4:          Cd4Calculator,
    pub(crate) viral_load:   ViralLoadCalculator,
    pub(crate) vl_slope:     ViralLoadSlopeCalculator,
    pub(crate) stages:       StageMap,
    pub(crate) prep:         PrepUptake,
    pub(crate) art_lag:      ArtLagCalculator,
    pub(crate) adherence:    AdherenceAssigner,
    pub(crate) condoms:      CondomUseAssigner,
    pub(crate) mortality:    AgeBinMortality,
    /// `None` when `daily.entry.rate` is not positive.
    pub(crate) entry_dist:   Option<Poisson<f64>>,
}

impl<D: NetworkDynamics> Model<D> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run to `stop.at`, then finish the run.
    pub fn run<R: Recorder>(&mut self, recorder: &mut R) -> SimResult<()> {
        self.run_until(self.config.run.stop_at, recorder)?;
        self.finish(recorder)
    }

    /// Fire every scheduled action up to and including `until` (capped at
    /// `stop.at`).  Can be called repeatedly with increasing bounds.
    pub fn run_until<R: Recorder>(&mut self, until: f64, recorder: &mut R) -> SimResult<()> {
        self.begin(recorder);
        let until = Tick(until.min(self.config.run.stop_at));
        while let Some(next) = self.queue.next_tick() {
            if next > until {
                break;
            }
            let Some((tick, action)) = self.queue.pop_next() else { break };
            self.now = tick;
            self.dispatch(tick, action, recorder)?;
        }
        Ok(())
    }

    /// End-of-run work: the end-of-run snapshot, a final record for every
    /// living person, then [`Recorder::run_end`].  Idempotent.
    pub fn finish<R: Recorder>(&mut self, recorder: &mut R) -> SimResult<()> {
        self.begin(recorder);
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        let tick = self.now.0;
        if self.config.run.save_network_at.contains(&SaveAt::End) {
            self.save_snapshot(tick, recorder);
        }
        for person in self.population.iter() {
            recorder.person_finalized(tick, person);
        }
        recorder.run_end(tick);
        info!(
            "run finished at tick {tick}: {} persons, {} steady and {} casual edges",
            self.population.len(),
            self.network.edge_count(EdgeType::Steady),
            self.network.edge_count(EdgeType::Casual)
        );
        Ok(())
    }

    /// Time of the last fired action.
    pub fn now(&self) -> f64 {
        self.now.0
    }

    pub fn rng(&self) -> &SimRng {
        &self.rng
    }

    /// Accumulated correction to the formation term of `kind`.
    pub fn theta(&self, kind: EdgeType) -> f64 {
        self.theta[kind.index()]
    }

    /// Persons whose vitals are logged every tick, in id order.
    pub fn biomarker_ids(&self) -> Vec<PersonId> {
        let mut ids: Vec<PersonId> = self.biomarkers.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of actions still scheduled.
    pub fn pending_actions(&self) -> usize {
        self.queue.len()
    }

    /// Persons waiting for ART initiation at `tick`.
    pub fn art_batch(&self, tick: f64) -> &[PersonId] {
        self.art.batch(Tick(tick))
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot::capture(self.now.whole() as f64, &self.population, &self.network)
    }

    // ── Start of run ──────────────────────────────────────────────────────

    /// Initial records and the tick-0 counts.  Runs once, before the first
    /// action.
    fn begin<R: Recorder>(&mut self, recorder: &mut R) {
        if self.started {
            return;
        }
        self.started = true;

        for person in self.population.iter() {
            recorder.person_entered(0.0, person);
            if person.is_infected() {
                self.counts.internal_infected += 1;
                recorder.infection(&InfectionEvent::unlinked(
                    person.infection.time_of_infection,
                    person,
                    InfectionSource::Internal,
                ));
            }
            if person.is_on_prep() {
                recorder.prep(person.prep.start_time, person.id, PrepStatus::On);
            }
        }
        self.close_counts(0.0, recorder);

        info!(
            "model starting: {} persons, {} steady and {} casual edges, stop at {}",
            self.population.len(),
            self.network.edge_count(EdgeType::Steady),
            self.network.edge_count(EdgeType::Casual),
            self.config.run.stop_at
        );
    }

    fn close_counts<R: Recorder>(&mut self, tick: f64, recorder: &mut R) {
        self.counts.tick = tick;
        self.counts.size = self.network.vertex_count();
        self.counts.main_edge_count = self.network.edge_count(EdgeType::Steady);
        self.counts.casual_edge_count = self.network.edge_count(EdgeType::Casual);
        recorder.tick_counts(&self.counts);
        self.counts.reset();
    }

    // ── Event dispatch ────────────────────────────────────────────────────

    fn dispatch<R: Recorder>(&mut self, tick: Tick, action: Action, recorder: &mut R) -> SimResult<()> {
        match action {
            Action::Step => {
                self.step(tick.0, recorder)?;
                let next = tick + 1.0;
                if next.0 <= self.config.run.stop_at {
                    self.queue.push(next, Action::Step);
                }
            }
            Action::ArtInit(batch) => self.initiate_art(batch, recorder),
            Action::AdherenceCheck(id) => self.check_adherence(tick.0, id, recorder),
            Action::PrepCessation { person, stop_time } => {
                self.end_prep(tick.0, person, stop_time, recorder)
            }
            Action::Snapshot => self.save_snapshot(tick.whole() as f64, recorder),
        }
        Ok(())
    }

    // ── Step pipeline ─────────────────────────────────────────────────────

    fn step<R: Recorder>(&mut self, tick: f64, recorder: &mut R) -> SimResult<()> {
        if (tick as i64) % PROGRESS_EVERY == 0 {
            info!(
                "tick {tick}: {} persons, {} steady and {} casual edges",
                self.population.len(),
                self.network.edge_count(EdgeType::Steady),
                self.network.edge_count(EdgeType::Casual)
            );
        }

        let mut editor = EdgeEditor {
            network:    &mut self.network,
            population: &self.population,
            condoms:    &self.condoms,
            rng:        &mut self.rng,
        };
        self.dynamics.update(tick, &mut editor)?;

        self.counts.overlaps = if self.config.run.count_overlaps {
            self.network.count_overlaps() as i64
        } else {
            -1
        };

        self.entries(tick, recorder)?;
        self.run_transmission(tick, recorder)?;
        let uninfected = self.update_vitals(tick, recorder)?;
        self.external_infections(tick, &uninfected, recorder)?;
        self.update_theta();
        self.close_counts(tick, recorder);
        Ok(())
    }

    fn entries<R: Recorder>(&mut self, tick: f64, recorder: &mut R) -> SimResult<()> {
        if self.population.is_empty() {
            return Ok(());
        }
        let Some(dist) = self.entry_dist.as_ref() else {
            return Ok(());
        };
        let draw: f64 = self.rng.sample(dist);
        let n = draw as u32;
        self.counts.entries = n;

        let min_age = self.config.demography.min_age;
        let prevalence = self.config.demography.init_hiv_prev_entries;
        for _ in 0..n {
            let mut person = self.creator.create(tick, min_age, &mut self.rng);
            let infected_at = tick - ENTRY_INFECTION_LEAD_TICKS;
            let infected = self.rng.uniform() <= prevalence;
            if infected {
                self.transmission.infect(&mut person, infected_at);
                person.infection.viral_load = self.viral_load.viral_load(&person.infection);
                person.infection.cd4_count = self.cd4.cd4(person.age, &person.infection);
                self.counts.infected_at_entry += 1;
            }
            self.network.add_vertex(person.id)?;
            recorder.person_entered(tick, &person);
            if infected {
                recorder.infection(&InfectionEvent::unlinked(infected_at, &person, InfectionSource::Entry));
            }
            self.population.insert(person);
        }
        Ok(())
    }

    fn run_transmission<R: Recorder>(&mut self, tick: f64, recorder: &mut R) -> SimResult<()> {
        let mut infections = Vec::new();
        for edge in self.network.edges() {
            if !self.rng.bernoulli(self.config.sex_acts.prob(edge.kind)) {
                continue;
            }
            let condom_used = edge.use_condom(self.rng.uniform());
            let a = self.population.get(edge.v1).ok_or(SimError::UnknownPerson(edge.v1))?;
            let b = self.population.get(edge.v2).ok_or(SimError::UnknownPerson(edge.v2))?;
            let discordant = match (a.is_infected(), b.is_infected()) {
                (true, false) => Some((a, b)),
                (false, true) => Some((b, a)),
                _ => None,
            };
            if let Some((infected, susceptible)) = discordant {
                if self.transmission.determine_infection(infected, susceptible, condom_used, edge.kind, &mut self.rng) {
                    infections.push((susceptible.id, PartnerState::of(infected), edge.kind, condom_used));
                }
            }
            self.counts.record_sex_act(edge.kind, condom_used, discordant.is_some());
        }

        for (id, partner, kind, condom_used) in infections {
            let person = self.population.get_mut(id).ok_or(SimError::UnknownPerson(id))?;
            // Two partners may both have transmitted this tick.
            if person.is_infected() {
                continue;
            }
            self.transmission.infect(person, tick);
            self.counts.internal_infected += 1;
            recorder.infection(&InfectionEvent {
                tick,
                source: InfectionSource::Internal,
                infected: id,
                age: person.age,
                on_prep: person.is_on_prep(),
                partner: Some(partner),
                network: Some(kind),
                condom_used: Some(condom_used),
            });
        }
        Ok(())
    }

    /// Per-person update.  Returns the uninfected survivors, the pool for
    /// external infections.
    fn update_vitals<R: Recorder>(&mut self, tick: f64, recorder: &mut R) -> SimResult<Vec<PersonId>> {
        let mut dead = Vec::new();
        let mut uninfected = Vec::new();
        let step = self.config.run.step;
        let max_age = self.config.demography.max_age;

        for id in self.population.ids() {
            let person = self.population.get_mut(id).ok_or(SimError::UnknownPerson(id))?;

            if person.is_infected() {
                person.infection.viral_load = self.viral_load.viral_load(&person.infection);
                person.infection.cd4_count = self.cd4.cd4(person.age, &person.infection);
                person.infectivity = self.stages.infectivity(&person.infection);
            } else if let Some(stop_time) = self.prep.try_start(person, tick, &mut self.rng) {
                self.queue.push(Tick(stop_time), Action::PrepCessation { person: id, stop_time });
                recorder.prep(tick, id, PrepStatus::On);
            }

            if self.biomarkers.contains(&id) {
                recorder.biomarker(tick, person);
            }

            if person.testable && !person.diagnosed {
                let outcome = person.diagnose(tick, self.creator.testing_dist(), &mut self.rng);
                if outcome.result != TestResult::NoTest {
                    recorder.test(tick, person, outcome.result == TestResult::Positive);
                }
                if outcome.prep_stopped {
                    cancel_prep_cessation(&mut self.queue, id, person.prep.stop_time);
                    recorder.prep(tick, id, PrepStatus::OffInfected);
                }
                if outcome.result == TestResult::Positive {
                    let lag = self.art_lag.lag(step, &mut self.rng);
                    recorder.art_lag(id, lag);
                    let at = Tick(tick + lag);
                    if self.art.add(at, id) {
                        self.queue.push(at - 0.1, Action::ArtInit(at));
                    }
                }
            }

            person.step(step);

            let cause = self.mortality.cause_of_death(person, max_age, &mut self.rng);
            match cause {
                CauseOfDeath::None => {
                    if !person.is_infected() {
                        self.counts.uninfected += 1;
                        uninfected.push(id);
                    }
                }
                CauseOfDeath::Age => self.counts.age_deaths += 1,
                CauseOfDeath::Infection => self.counts.infection_deaths += 1,
                CauseOfDeath::Asm => self.counts.asm_deaths += 1,
            }
            if cause != CauseOfDeath::None {
                person.dead = true;
                if person.is_on_prep() {
                    cancel_prep_cessation(&mut self.queue, id, person.prep.stop_time);
                    person.go_off_prep(PrepStatus::OffOther);
                    recorder.prep(tick, id, PrepStatus::OffOther);
                }
                recorder.death(tick, person, cause);
                dead.push((id, cause));
            }
        }

        for (id, cause) in dead {
            for edge in self.network.remove_vertex(id)? {
                recorder.partnership_ended(tick, &edge, cause.partnership_end());
            }
            self.population.remove(id);
            debug!("{id} died at {tick} ({cause:?})");
        }
        Ok(uninfected)
    }

    /// At most one infection per tick from outside the network.  Always
    /// consumes two draws; a third picks the person.
    fn external_infections<R: Recorder>(
        &mut self,
        tick: f64,
        uninfected: &[PersonId],
        recorder: &mut R,
    ) -> SimResult<()> {
        let ext = self.config.external;
        let rate = self.rng.uniform_between(ext.rate_min, ext.rate_max);
        let prob = uninfected.len() as f64 * rate;
        if self.rng.uniform() > prob || uninfected.is_empty() {
            return Ok(());
        }
        let id = uninfected[self.rng.gen_range(0..uninfected.len())];
        let person = self.population.get_mut(id).ok_or(SimError::UnknownPerson(id))?;
        self.transmission.infect(person, tick);
        self.counts.external_infected += 1;
        debug!("external infection of {id} at {tick}");
        recorder.infection(&InfectionEvent::unlinked(tick, person, InfectionSource::External));
        Ok(())
    }

    fn update_theta(&mut self) {
        let previous = self.current_size;
        self.current_size = self.network.vertex_count();
        if previous == 0 || self.current_size == 0 {
            return;
        }
        let delta = (previous as f64).ln() - (self.current_size as f64).ln();
        for kind in EdgeType::ALL {
            self.theta[kind.index()] += delta;
            self.dynamics.adjust_theta(kind, delta);
        }
    }

    // ── Scheduled actions ─────────────────────────────────────────────────

    fn initiate_art<R: Recorder>(&mut self, batch: Tick, recorder: &mut R) {
        let window = self.adherence.window_length();
        for id in self.art.take(batch) {
            let Some(person) = self.population.get_mut(id) else {
                warn!("ART initiation at {}: {id} is no longer in the population", batch.0);
                continue;
            };
            if !person.adherence.is_assigned() {
                person.adherence = self.adherence.assign(&mut self.rng);
            }
            person.go_on_art(batch.0);
            person.infection.vl_art_traj_slope = self.vl_slope.slope(&person.infection);
            recorder.art(batch.0, person, true);
            self.queue.push(batch + window - 0.1, Action::AdherenceCheck(id));
        }
    }

    fn check_adherence<R: Recorder>(&mut self, tick: f64, id: PersonId, recorder: &mut R) {
        let Some(person) = self.population.get_mut(id) else {
            debug!("adherence check at {tick}: {id} has died");
            return;
        };
        let adhered = self.rng.bernoulli(person.adherence.probability);
        if adhered {
            person.adherence.adhered_intervals += 1;
            if !person.is_on_art() {
                person.go_on_art(tick);
                person.infection.vl_art_traj_slope = self.vl_slope.slope(&person.infection);
                recorder.art(tick, person, true);
            }
        } else {
            person.adherence.non_adhered_intervals += 1;
            if person.is_on_art() {
                person.go_off_art();
                recorder.art(tick, person, false);
            }
        }
        recorder.adherence_interval(id, adhered);
        self.queue.push(Tick(tick + self.adherence.window_length()), Action::AdherenceCheck(id));
    }

    fn end_prep<R: Recorder>(&mut self, tick: f64, id: PersonId, stop_time: f64, recorder: &mut R) {
        let Some(person) = self.population.get_mut(id) else {
            warn!("PrEP cessation at {tick}: {id} is no longer in the population");
            return;
        };
        if !person.is_on_prep() || person.prep.stop_time != stop_time {
            return;
        }
        person.go_off_prep(PrepStatus::Off);
        debug!("{id} stopped PrEP at {tick}");
        recorder.prep(tick, id, PrepStatus::Off);
    }

    fn save_snapshot<R: Recorder>(&mut self, tick: f64, recorder: &mut R) {
        let snapshot = NetworkSnapshot::capture(tick, &self.population, &self.network);
        info!(
            "network snapshot at tick {tick}: {} persons, {} edges",
            snapshot.persons.len(),
            snapshot.edges.len()
        );
        recorder.snapshot(&snapshot);
    }
}

/// Drop the pending cessation of the spell ending at `stop_time`.
fn cancel_prep_cessation(queue: &mut EventQueue<Action>, id: PersonId, stop_time: f64) {
    queue.cancel(Tick(stop_time), |a| {
        matches!(a, Action::PrepCessation { person, .. } if *person == id)
    });
}
