//! Strongly typed model configuration.
//!
//! [`ModelConfig::from_parameters`] reads every key the model uses out of a
//! raw [`Parameters`] store once, validates it, and fails on the first
//! missing or malformed value.  Key names follow the long-standing parameter
//! files of the model (`size.of.timestep`, `acute.length.max`, ...).
//!
//! Two tables have a variable number of rows and are discovered by prefix:
//!
//! | Prefix          | Key form            | Value             |
//! |-----------------|---------------------|-------------------|
//! | `asm.`          | `asm.15-25`, `asm.65+` | daily death probability |
//! | `art.init.lag.` | `art.init.lag.1`    | `"1-30|0.6"` (days, probability) |

use tm_core::{CoreError, Parameters, TimeStep};
use tm_disease::{
    AdherenceParams, BValues, Cd4Calculator, CondomUseRow, LagBin, MortalityBin,
    TransmissionParams, ViralLoadParams,
};
use tm_network::{CondomCategory, EdgeType};
use tm_person::{CreatorParams, RoleProbabilities};

use crate::{SimError, SimResult};

pub const ASM_PREFIX: &str = "asm.";
pub const ART_LAG_PREFIX: &str = "art.init.lag.";

// ── Sub-configurations ────────────────────────────────────────────────────────

/// When to export a network snapshot.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SaveAt {
    /// After the step of this tick (fires at `tick + 0.1`).
    Tick(f64),
    /// At the end of the run.
    End,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    pub seed:                u64,
    pub stop_at:             f64,
    pub step:                TimeStep,
    pub count_overlaps:      bool,
    pub biomarker_log_count: usize,
    pub save_network_at:     Vec<SaveAt>,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DemographyConfig {
    pub min_age:               f64,
    pub max_age:               f64,
    /// Poisson mean of entries per tick.
    pub daily_entry_rate:      f64,
    /// Chance an entering person is already infected.
    pub init_hiv_prev_entries: f64,
}

/// Per-tick probability that a partnership has a sex act, already scaled by
/// the time step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SexActConfig {
    pub prop_steady: f64,
    pub prop_casual: f64,
}

impl SexActConfig {
    pub fn prob(&self, kind: EdgeType) -> f64 {
        match kind {
            EdgeType::Steady => self.prop_steady,
            EdgeType::Casual => self.prop_casual,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StageConfig {
    pub acute_max:            f64,
    pub chronic_max:          f64,
    pub acute_mult:           f64,
    pub late_mult:            f64,
    pub baseline_infectivity: f64,
    pub vl_increment:         f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PrepConfig {
    pub daily_stop_prob: f64,
    /// Target steady-state coverage among the uninfected.
    pub coverage:        f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ExternalInfectionConfig {
    /// Per-person daily rate, drawn uniformly from `[rate_min, rate_max]`
    /// once per tick.
    pub rate_min: f64,
    pub rate_max: f64,
}

// ── ModelConfig ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct ModelConfig {
    pub run:          RunConfig,
    pub demography:   DemographyConfig,
    pub sex_acts:     SexActConfig,
    pub transmission: TransmissionParams,
    pub cd4:          Cd4Calculator,
    pub viral_load:   ViralLoadParams,
    pub stages:       StageConfig,
    pub persons:      CreatorParams,
    pub prep:         PrepConfig,
    pub art_lag:      Vec<LagBin>,
    pub adherence:    AdherenceParams,
    /// `[partnership type][network type]`, serodiscordant first.
    pub condoms:      [[CondomUseRow; 2]; 2],
    pub mortality:    Vec<MortalityBin>,
    pub external:     ExternalInfectionConfig,
}

impl ModelConfig {
    pub fn from_parameters(p: &Parameters) -> SimResult<Self> {
        let step = TimeStep::new(p.get_f64("size.of.timestep")?);
        if step.days <= 0.0 {
            return Err(SimError::Config(format!(
                "size.of.timestep must be positive, got {}",
                step.days
            )));
        }

        let run = RunConfig {
            seed: if p.contains("random.seed") { non_negative_int(p, "random.seed")? } else { 1 },
            stop_at: p.get_f64("stop.at")?,
            step,
            count_overlaps: p.get_bool_or("count.overlaps", false)?,
            biomarker_log_count: if p.contains("biomarker.number.of.persons.to.log") {
                non_negative_int(p, "biomarker.number.of.persons.to.log")? as usize
            } else {
                0
            },
            save_network_at: if p.contains("save.network.at") {
                parse_save_at(p.get_string("save.network.at")?)?
            } else {
                Vec::new()
            },
        };

        let demography = DemographyConfig {
            min_age:               p.get_f64("min.age")?,
            max_age:               p.get_f64("max.age")?,
            daily_entry_rate:      p.get_f64("daily.entry.rate")?,
            init_hiv_prev_entries: probability(p, "init.hiv.prev.for.entries")?,
        };

        // Scaled once here; the pipeline uses these values as they are.
        let sex_acts = SexActConfig {
            prop_steady: scaled_probability(p, "prop.steady.sex.acts", step)?,
            prop_casual: scaled_probability(p, "prop.casual.sex.acts", step)?,
        };

        let transmission = TransmissionParams {
            circum_mult:    p.get_f64("circum.mult")?,
            prep_mult:      p.get_f64("prep.transm.red")?,
            condom_mult:    p.get_f64("inf.red.w.condom")?,
            insertive_mult: p.get_f64("inf.part.insertive.mult")?,
            dur_inf_by_age: parse_dur_inf(p, "given.dur.inf.by.age")?,
        };

        let cd4 = Cd4Calculator {
            step,
            recovery_time:        p.get_f64("cd4.recovery.time")?,
            cd4_at_infection:     p.get_f64("cd4.at.infection.male")?,
            per_day_cd4_recovery: p.get_f64("per.day.cd4.recovery")?,
            b: BValues {
                b1_ref:          p.get_f64("b1.ref")?,
                b2_african:      p.get_f64_or("b2.african", 0.0)?,
                b3_female:       p.get_f64_or("b3.female", 0.0)?,
                b4_cd4_ref:      p.get_f64("b4.cd4.ref")?,
                b5_african:      p.get_f64_or("b5.african", 0.0)?,
                b6_age_15to29:   p.get_f64("b6.age.15to29")?,
                b6_age_30to39:   p.get_f64("b6.age.30to39")?,
                b6_age_40to49:   p.get_f64("b6.age.40to49")?,
                b6_age_50ormore: p.get_f64("b6.age.50ormore")?,
            },
        };

        let viral_load = ViralLoadParams {
            time_infection_to_peak_load:  p.get_f64("time.infection.to.peak.viral.load")?,
            time_infection_to_set_point:  p.get_f64("time.infection.to.viral.set.point")?,
            time_infection_to_late_stage: p.get_f64("time.infection.to.late.stage")?,
            time_to_full_supp:            p.get_f64("time.to.full.supp")?,
            peak_viral_load:              p.get_f64("peak.viral.load")?,
            set_point_viral_load:         p.get_f64("set.point.viral.load")?,
            late_stage_viral_load:        p.get_f64("late.stage.viral.load")?,
            undetectable_viral_load:      p.get_f64("undetectable.vl")?,
        };
        if viral_load.time_to_full_supp <= 0.0 {
            return Err(SimError::Config("time.to.full.supp must be positive".into()));
        }

        let stages = StageConfig {
            acute_max:            p.get_f64("acute.length.max")?,
            chronic_max:          p.get_f64("chronic.length.max")?,
            acute_mult:           p.get_f64("acute.mult")?,
            late_mult:            p.get_f64("late.mult")?,
            baseline_infectivity: p.get_f64("min.chronic.infectivity.unadj")?,
            vl_increment:         p.get_f64("inf.inc.log.vl")?,
        };

        let persons = CreatorParams {
            circum_rate:        probability(p, "circum.rate")?,
            non_testers_prop:   probability(p, "non.testers.prop")?,
            daily_testing_prob: probability(p, "daily.testing.prob")?,
            detection_window:   p.get_f64("detection.window")?,
            steady_roles: RoleProbabilities {
                insertive: probability(p, "pr_insertive_main")?,
                receptive: probability(p, "pr_receptive_main")?,
            },
            casual_roles: RoleProbabilities {
                insertive: probability(p, "pr_insertive_casual")?,
                receptive: probability(p, "pr_receptive_casual")?,
            },
        };

        let prep = PrepConfig {
            daily_stop_prob: probability(p, "prep.daily.stop.prob")?,
            coverage:        probability(p, "prep.bl.use.prop")?,
        };

        let adherence = AdherenceParams {
            prop_never:       probability(p, "prop.never.adherent")?,
            prop_always:      probability(p, "prop.always.adherent")?,
            prop_partial_pos: probability(p, "prop.part.plus.adherent")?,
            prop_partial_neg: probability(p, "prop.part.neg.adherent")?,
            never_prob:       probability(p, "never.adherent.probability")?,
            always_prob:      probability(p, "always.adherent.probability")?,
            partial_pos_prob: probability(p, "partial.pos.adherent.probability")?,
            partial_neg_prob: probability(p, "partial.neg.adherent.probability")?,
            window_length:    p.get_f64("partial.art_adher.window.length")?,
        };

        let external = ExternalInfectionConfig {
            rate_min: p.get_f64("external.infections.per.person.day.min")?,
            rate_max: p.get_f64("external.infections.per.person.day.max")?,
        };
        if !(0.0 <= external.rate_min && external.rate_min <= external.rate_max) {
            return Err(SimError::Config(format!(
                "external infection rate range [{}, {}] is invalid",
                external.rate_min, external.rate_max
            )));
        }

        Ok(Self {
            run,
            demography,
            sex_acts,
            transmission,
            cd4,
            viral_load,
            stages,
            persons,
            prep,
            art_lag: parse_art_lag(p)?,
            adherence,
            condoms: parse_condoms(p)?,
            mortality: parse_mortality(p)?,
            external,
        })
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn probability(p: &Parameters, key: &str) -> SimResult<f64> {
    let v = p.get_f64(key)?;
    if !(0.0..=1.0).contains(&v) {
        return Err(SimError::Config(format!("{key} must be a probability, got {v}")));
    }
    Ok(v)
}

fn scaled_probability(p: &Parameters, key: &str, step: TimeStep) -> SimResult<f64> {
    let v = p.get_f64(key)? * step.days;
    if !(0.0..=1.0).contains(&v) {
        return Err(SimError::Config(format!(
            "{key} scaled by size.of.timestep ({}) is {v}, not a probability",
            step.days
        )));
    }
    Ok(v)
}

fn non_negative_int(p: &Parameters, key: &str) -> SimResult<u64> {
    let v = p.get_i64(key)?;
    u64::try_from(v).map_err(|_| SimError::Config(format!("{key} must not be negative, got {v}")))
}

fn parse_error(key: &str, value: &str, expected: &'static str) -> SimError {
    SimError::Core(CoreError::Parse { key: key.to_string(), value: value.to_string(), expected })
}

/// `"100, 250.5, end"` → `[Tick(100), Tick(250.5), End]`.
pub fn parse_save_at(text: &str) -> SimResult<Vec<SaveAt>> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            if s.eq_ignore_ascii_case("end") {
                Ok(SaveAt::End)
            } else {
                s.parse::<f64>()
                    .map(SaveAt::Tick)
                    .map_err(|_| parse_error("save.network.at", s, "a tick or `end`"))
            }
        })
        .collect()
}

/// One value for every age band, or one per band.
fn parse_dur_inf(p: &Parameters, key: &str) -> SimResult<[f64; 4]> {
    let text = p.get_string(key)?;
    let values = text
        .split(',')
        .map(|s| s.trim().parse::<f64>().map_err(|_| parse_error(key, text, "a duration list")))
        .collect::<SimResult<Vec<_>>>()?;
    match values.as_slice() {
        [all] => Ok([*all; 4]),
        [a, b, c, d] => Ok([*a, *b, *c, *d]),
        _ => Err(parse_error(key, text, "one duration or four comma-separated durations")),
    }
}

/// `art.init.lag.<n> = "<min>-<max>|<prob>"`.
fn parse_art_lag(p: &Parameters) -> SimResult<Vec<LagBin>> {
    const EXPECTED: &str = "a lag bin `min-max|prob`";
    p.keys_with_prefix(ART_LAG_PREFIX)
        .map(|key| -> SimResult<LagBin> {
            let value = p.get_string(key)?;
            let (range, prob) = value.split_once('|').ok_or_else(|| parse_error(key, value, EXPECTED))?;
            let (min, max) = range.split_once('-').ok_or_else(|| parse_error(key, value, EXPECTED))?;
            let min_days = min.trim().parse().map_err(|_| parse_error(key, value, EXPECTED))?;
            let max_days = max.trim().parse().map_err(|_| parse_error(key, value, EXPECTED))?;
            let prob = prob.trim().parse().map_err(|_| parse_error(key, value, EXPECTED))?;
            Ok(LagBin { min_days, max_days, prob })
        })
        .collect::<SimResult<Vec<_>>>()
        .map(|mut bins| {
            bins.sort_by_key(|b| b.min_days);
            bins
        })
}

/// `asm.<lo>-<hi> = p` or, for the open-ended last bin, `asm.<lo>+ = p`.
fn parse_mortality(p: &Parameters) -> SimResult<Vec<MortalityBin>> {
    const EXPECTED: &str = "an age bin `lo-hi` or `lo+`";
    p.keys_with_prefix(ASM_PREFIX)
        .map(|key| -> SimResult<MortalityBin> {
            let bin = &key[ASM_PREFIX.len()..];
            let (lower, upper) = match bin.strip_suffix('+') {
                Some(lo) => (lo, None),
                None => {
                    let (lo, hi) = bin.split_once('-').ok_or_else(|| parse_error(key, bin, EXPECTED))?;
                    (lo, Some(hi))
                }
            };
            let lower = lower.trim().parse().map_err(|_| parse_error(key, bin, EXPECTED))?;
            let upper = upper
                .map(|hi| hi.trim().parse().map_err(|_| parse_error(key, bin, EXPECTED)))
                .transpose()?;
            Ok(MortalityBin { lower, upper, prob: probability(p, key)? })
        })
        .collect()
}

/// The 40 condom-use keys: `{sd,sc}.{steady,casual}.{category}.use.condoms`
/// for the category probability and the same with `.prob` for the per-act
/// use probability.
fn parse_condoms(p: &Parameters) -> SimResult<[[CondomUseRow; 2]; 2]> {
    let mut rows = [[CondomUseRow::default(); 2]; 2];
    for (pi, ptype) in ["sd", "sc"].iter().enumerate() {
        for kind in EdgeType::ALL {
            let row = &mut rows[pi][kind.index()];
            for (ci, category) in CondomCategory::ALL.iter().enumerate() {
                let key = format!("{ptype}.{kind}.{}.use.condoms", category.name());
                row.category_probs[ci] = probability(p, &key)?;
                row.use_probs[ci] = probability(p, &format!("{key}.prob"))?;
            }
        }
    }
    Ok(rows)
}
