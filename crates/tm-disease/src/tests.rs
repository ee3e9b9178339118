//! Unit tests for tm-disease.

#[cfg(test)]
fn person(id: u32, age: f64) -> tm_person::Person {
    use tm_core::PersonId;
    use tm_person::{Diagnoser, Person, SexualRole};
    Person::new(
        PersonId(id),
        age,
        false,
        SexualRole::Versatile,
        SexualRole::Versatile,
        Diagnoser::restore(0.0, 1.0e9, 0),
    )
}

#[cfg(test)]
mod cd4_tests {
    use approx::assert_relative_eq;
    use tm_core::TimeStep;
    use tm_person::InfectionRecord;

    use crate::{BValues, Cd4Calculator};

    fn calc() -> Cd4Calculator {
        Cd4Calculator {
            step:                 TimeStep::default(),
            recovery_time:        1000.0,
            cd4_at_infection:     518.0,
            per_day_cd4_recovery: 0.05,
            b: BValues {
                b1_ref:          22.0,
                b4_cd4_ref:      -1.5,
                b6_age_15to29:   0.0,
                b6_age_30to39:   -0.1,
                b6_age_40to49:   -0.2,
                b6_age_50ormore: -0.3,
                ..BValues::default()
            },
        }
    }

    fn infected(tsi: f64) -> InfectionRecord {
        InfectionRecord { infected: true, time_since_infection: tsi, ..Default::default() }
    }

    #[test]
    fn pure_function() {
        let c = calc();
        let rec = infected(400.0);
        assert_eq!(c.cd4(33.0, &rec), c.cd4(33.0, &rec));
    }

    #[test]
    fn untreated_declines_monotonically() {
        let c = calc();
        let mut last = f64::INFINITY;
        for tsi in (0..8000).step_by(100) {
            let v = c.cd4(25.0, &infected(tsi as f64));
            assert!(v <= last, "tsi {tsi}: {v} > {last}");
            assert!(v >= 0.0);
            last = v;
        }
        assert_relative_eq!(c.cd4(25.0, &infected(0.0)), 484.0);
    }

    #[test]
    fn untreated_floor_is_zero() {
        let c = calc();
        assert_eq!(c.cd4(60.0, &infected(365.0 * 30.0)), 0.0);
    }

    #[test]
    fn older_persons_decline_faster() {
        let c = calc();
        let rec = infected(365.0 * 5.0);
        assert!(c.cd4(55.0, &rec) < c.cd4(20.0, &rec));
    }

    #[test]
    fn treated_recovery_is_capped() {
        let c = calc();
        let mut rec = infected(2000.0);
        rec.art_status = true;
        rec.cd4_at_art_init = 200.0;
        rec.time_since_art_init = 100.0;
        assert_relative_eq!(c.cd4(30.0, &rec), 205.0);
        rec.time_since_art_init = 5000.0;
        assert_relative_eq!(c.cd4(30.0, &rec), 250.0);
    }
}

#[cfg(test)]
mod viral_load_tests {
    use approx::assert_relative_eq;
    use tm_person::InfectionRecord;

    use crate::{ViralLoadCalculator, ViralLoadParams, ViralLoadSlopeCalculator};

    fn calc() -> ViralLoadCalculator {
        ViralLoadCalculator::new(ViralLoadParams {
            time_infection_to_peak_load:  14.0,
            time_infection_to_set_point:  42.0,
            time_infection_to_late_stage: 3000.0,
            time_to_full_supp:            120.0,
            peak_viral_load:              6.0,
            set_point_viral_load:         4.2,
            late_stage_viral_load:        5.1,
            undetectable_viral_load:      1.7,
        })
    }

    fn at(tsi: f64) -> InfectionRecord {
        InfectionRecord {
            infected: true,
            time_since_infection: tsi,
            dur_inf_by_age: 3600.0,
            ..Default::default()
        }
    }

    #[test]
    fn untreated_milestones() {
        let c = calc();
        assert_relative_eq!(c.viral_load(&at(0.0)), 0.0, epsilon = 1e-9);
        assert_relative_eq!(c.viral_load(&at(7.0)), 3.0, epsilon = 1e-9);
        assert_relative_eq!(c.viral_load(&at(14.0)), 6.0, epsilon = 1e-9);
        assert_relative_eq!(c.viral_load(&at(28.0)), 5.1, epsilon = 1e-9);
        assert_relative_eq!(c.viral_load(&at(42.0)), 4.2, epsilon = 1e-9);
        assert_relative_eq!(c.viral_load(&at(1000.0)), 4.2, epsilon = 1e-9);
        assert_relative_eq!(c.viral_load(&at(3300.0)), 4.65, epsilon = 1e-9);
        assert_relative_eq!(c.viral_load(&at(3600.0)), 5.1, epsilon = 1e-9);
        assert_relative_eq!(c.viral_load(&at(9000.0)), 5.1, epsilon = 1e-9);
    }

    #[test]
    fn treated_falls_to_floor() {
        let c = calc();
        let slope_calc = ViralLoadSlopeCalculator { undetectable_viral_load: 1.7, time_to_full_supp: 120.0 };
        let mut rec = at(500.0);
        rec.art_status = true;
        rec.vl_at_art_init = 4.1;
        rec.vl_art_traj_slope = slope_calc.slope(&rec);
        assert_relative_eq!(rec.vl_art_traj_slope, -0.02, epsilon = 1e-12);

        rec.time_since_art_init = 0.0;
        assert_relative_eq!(c.viral_load(&rec), 4.1, epsilon = 1e-9);
        rec.time_since_art_init = 60.0;
        assert_relative_eq!(c.viral_load(&rec), 2.9, epsilon = 1e-9);
        rec.time_since_art_init = 120.0;
        assert_relative_eq!(c.viral_load(&rec), 1.7, epsilon = 1e-9);
        rec.time_since_art_init = 500.0;
        assert_relative_eq!(c.viral_load(&rec), 1.7, epsilon = 1e-9);
    }
}

#[cfg(test)]
mod stage_tests {
    use approx::assert_relative_eq;
    use tm_person::InfectionRecord;

    use crate::{StageKind, StageMap};

    fn map() -> StageMap {
        StageMap::new(90.0, 3000.0, 5.0, 3.0, 0.001, 2.0).unwrap()
    }

    #[test]
    fn boundaries_go_to_the_later_stage() {
        let m = map();
        assert_eq!(m.stage_for(0.0).kind, StageKind::Acute);
        assert_eq!(m.stage_for(89.0).kind, StageKind::Acute);
        assert_eq!(m.stage_for(90.0).kind, StageKind::Chronic);
        assert_eq!(m.stage_for(2999.0).kind, StageKind::Chronic);
        assert_eq!(m.stage_for(3000.0).kind, StageKind::Late);
        assert_eq!(m.stage_for(1.0e12).kind, StageKind::Late);
    }

    #[test]
    fn lookup_is_total_and_exclusive() {
        let m = map();
        for t in 0..10_000 {
            let tsi = t as f64 * 0.5;
            let hits = m.stages().iter().filter(|s| s.contains(tsi)).count();
            assert_eq!(hits, 1, "tsi {tsi}");
            assert!(m.stage_for(tsi).contains(tsi));
        }
    }

    #[test]
    fn infectivity_by_stage() {
        let m = map();
        let mut rec = InfectionRecord {
            infected: true,
            viral_load: 5.0,
            dur_inf_by_age: 4000.0,
            ..Default::default()
        };
        // base = 0.001 * 2^(5 - 4)
        let base = 0.002;

        rec.time_since_infection = 0.0;
        assert_relative_eq!(m.infectivity(&rec), base * 5.0, epsilon = 1e-12);
        rec.time_since_infection = 45.0;
        assert_relative_eq!(m.infectivity(&rec), base * 3.0, epsilon = 1e-12);
        rec.time_since_infection = 500.0;
        assert_relative_eq!(m.infectivity(&rec), base, epsilon = 1e-12);
        rec.time_since_infection = 3000.0;
        assert_relative_eq!(m.infectivity(&rec), base, epsilon = 1e-12);
        rec.time_since_infection = 3500.0;
        assert_relative_eq!(m.infectivity(&rec), base * 2.0, epsilon = 1e-12);
        rec.time_since_infection = 4000.0;
        assert_relative_eq!(m.infectivity(&rec), base * 3.0, epsilon = 1e-12);
    }

    #[test]
    fn rejects_unordered_bounds() {
        assert!(StageMap::new(100.0, 50.0, 1.0, 1.0, 0.001, 2.0).is_err());
    }
}

#[cfg(test)]
mod transmission_tests {
    use tm_core::SimRng;
    use tm_network::EdgeType;
    use tm_person::SexualRole;

    use super::person;
    use crate::{TransmissionParams, TransmissionRunner};

    fn runner(mult: f64) -> TransmissionRunner {
        TransmissionRunner::new(TransmissionParams {
            circum_mult:    mult,
            prep_mult:      mult,
            condom_mult:    mult,
            insertive_mult: mult,
            dur_inf_by_age: [3000.0, 3100.0, 3200.0, 3300.0],
        })
    }

    #[test]
    fn survival_cap_by_age_band() {
        let r = runner(1.0);
        assert_eq!(r.dur_inf_by_age(18.0), 3000.0);
        assert_eq!(r.dur_inf_by_age(25.0), 3100.0);
        assert_eq!(r.dur_inf_by_age(44.9), 3200.0);
        assert_eq!(r.dur_inf_by_age(70.0), 3300.0);

        let mut p = person(0, 30.0);
        r.infect(&mut p, 5.0);
        assert!(p.is_infected());
        assert_eq!(p.infection.dur_inf_by_age, 3100.0);
    }

    #[test]
    fn unreduced_probability_is_infectivity() {
        let r = runner(1.0);
        let mut inf = person(0, 30.0);
        inf.infect(3000.0, 0.0);
        inf.infectivity = 0.37;
        inf.steady_role = SexualRole::Insertive;
        let mut sus = person(1, 30.0);
        sus.steady_role = SexualRole::Receptive;

        let mut rng = SimRng::new(77);
        for _ in 0..200 {
            let mut replay = rng.clone();
            let infected = r.determine_infection(&inf, &sus, false, EdgeType::Steady, &mut rng);
            assert_eq!(infected, replay.uniform() <= 0.37);
        }
    }

    #[test]
    fn multipliers_compose() {
        let r = TransmissionRunner::new(TransmissionParams {
            circum_mult:    0.5,
            prep_mult:      0.1,
            condom_mult:    0.2,
            insertive_mult: 0.3,
            dur_inf_by_age: [1.0; 4],
        });
        let mut inf = person(0, 30.0);
        inf.infect(3000.0, 0.0);
        inf.infectivity = 1.0;
        let mut sus = person(1, 30.0);
        sus.circumcised = true;
        sus.go_on_prep(0.0, 100.0);

        // Infected insertive: insertive reduction, circumcision does not apply.
        let p = r.infection_probability(&inf, &sus, true, true);
        assert!((p - 0.3 * 0.2 * 0.1).abs() < 1e-12);
        // Susceptible insertive and circumcised.
        let p = r.infection_probability(&inf, &sus, false, false);
        assert!((p - 0.5 * 0.1).abs() < 1e-12);
    }

    #[test]
    fn roles_settle_insertive_without_a_draw() {
        let r = runner(1.0);
        let mut a = person(0, 30.0);
        let mut b = person(1, 30.0);
        a.casual_role = SexualRole::Versatile;
        b.casual_role = SexualRole::Receptive;

        let mut rng = SimRng::new(1);
        let mut shadow = rng.clone();
        assert!(r.infected_is_insertive(&a, &b, EdgeType::Casual, &mut rng));
        assert!(!r.infected_is_insertive(&b, &a, EdgeType::Casual, &mut rng));
        assert_eq!(rng.uniform(), shadow.uniform());
    }

    #[test]
    fn ambiguous_roles_draw_once() {
        let r = runner(1.0);
        let a = person(0, 30.0);
        let b = person(1, 30.0);
        let mut rng = SimRng::new(9);
        let mut replay = rng.clone();
        let insertive = r.infected_is_insertive(&a, &b, EdgeType::Steady, &mut rng);
        assert_eq!(insertive, replay.uniform() < 0.5);
        assert_eq!(rng.uniform(), replay.uniform());
    }
}

#[cfg(test)]
mod condom_tests {
    use tm_core::SimRng;
    use tm_network::{CondomCategory, EdgeType};

    use crate::{CondomUseAssigner, CondomUseRow, PartnershipType};

    fn row(cat: [f64; 5]) -> CondomUseRow {
        CondomUseRow { category_probs: cat, use_probs: [0.0, 0.25, 0.5, 0.75, 1.0] }
    }

    #[test]
    fn category_follows_table_row() {
        let always = row([0.0, 0.0, 0.0, 0.0, 1.0]);
        let never = row([1.0, 0.0, 0.0, 0.0, 0.0]);
        let a = CondomUseAssigner::new([[always, never], [never, never]]).unwrap();
        let mut rng = SimRng::new(5);
        for _ in 0..50 {
            let sd_steady = a.init_edge(PartnershipType::Serodiscordant, EdgeType::Steady, &mut rng);
            assert_eq!(sd_steady.category, CondomCategory::Always);
            assert_eq!(sd_steady.use_prob, 1.0);
            let sc_casual = a.init_edge(PartnershipType::Seroconcordant, EdgeType::Casual, &mut rng);
            assert_eq!(sc_casual.category, CondomCategory::Never);
        }
    }

    #[test]
    fn concordance() {
        assert_eq!(PartnershipType::of(true, false), PartnershipType::Serodiscordant);
        assert_eq!(PartnershipType::of(true, true), PartnershipType::Seroconcordant);
        assert_eq!(PartnershipType::of(false, false), PartnershipType::Seroconcordant);
    }

    #[test]
    fn rejects_overfull_row() {
        let bad = row([0.5, 0.5, 0.5, 0.0, 0.0]);
        let ok = row([1.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(CondomUseAssigner::new([[bad, ok], [ok, ok]]).is_err());
    }
}

#[cfg(test)]
mod art_tests {
    use tm_core::{SimRng, TimeStep};
    use tm_person::AdherenceCategory;

    use crate::{AdherenceAssigner, AdherenceParams, ArtLagCalculator, LagBin};

    #[test]
    fn single_day_bin() {
        let calc = ArtLagCalculator::new(vec![LagBin { min_days: 1, max_days: 1, prob: 1.0 }]).unwrap();
        let mut rng = SimRng::new(0);
        assert_eq!(calc.lag(TimeStep::default(), &mut rng), 1.0);
    }

    #[test]
    fn lag_within_bins_and_whole_ticks() {
        let calc = ArtLagCalculator::new(vec![
            LagBin { min_days: 1, max_days: 30, prob: 0.6 },
            LagBin { min_days: 31, max_days: 90, prob: 0.4 },
        ])
        .unwrap();
        let mut rng = SimRng::new(3);
        for _ in 0..500 {
            let lag = calc.lag(TimeStep::default(), &mut rng);
            assert!((1.0..=90.0).contains(&lag));
            assert_eq!(lag.fract(), 0.0);
        }
    }

    #[test]
    fn weekly_ticks_round_up() {
        let calc = ArtLagCalculator::new(vec![LagBin { min_days: 3, max_days: 3, prob: 1.0 }]).unwrap();
        let mut rng = SimRng::new(0);
        assert_eq!(calc.lag(TimeStep::new(7.0), &mut rng), 1.0);
    }

    #[test]
    fn invalid_bins() {
        assert!(ArtLagCalculator::new(vec![]).is_err());
        assert!(ArtLagCalculator::new(vec![LagBin { min_days: 0, max_days: 5, prob: 1.0 }]).is_err());
        assert!(ArtLagCalculator::new(vec![LagBin { min_days: 5, max_days: 2, prob: 1.0 }]).is_err());
        assert!(ArtLagCalculator::new(vec![LagBin { min_days: 1, max_days: 2, prob: 0.5 }]).is_err());
    }

    fn params() -> AdherenceParams {
        AdherenceParams {
            prop_never:       0.0,
            prop_always:      1.0,
            prop_partial_pos: 0.0,
            prop_partial_neg: 0.0,
            never_prob:       0.0,
            always_prob:      0.95,
            partial_pos_prob: 0.7,
            partial_neg_prob: 0.3,
            window_length:    30.0,
        }
    }

    #[test]
    fn adherence_assignment() {
        let a = AdherenceAssigner::new(params()).unwrap();
        let mut rng = SimRng::new(1);
        let rec = a.assign(&mut rng);
        assert_eq!(rec.category, AdherenceCategory::Always);
        assert_eq!(rec.probability, 0.95);
        assert_eq!(a.probability_for(AdherenceCategory::PartialNeg), 0.3);
        assert_eq!(a.probability_for(AdherenceCategory::Na), 0.0);
        assert_eq!(a.record_for(AdherenceCategory::PartialPos).probability, 0.7);
    }

    #[test]
    fn adherence_proportions_must_sum_to_one() {
        let p = AdherenceParams { prop_always: 0.5, ..params() };
        assert!(AdherenceAssigner::new(p).is_err());
        let p = AdherenceParams { window_length: 0.0, ..params() };
        assert!(AdherenceAssigner::new(p).is_err());
    }
}

#[cfg(test)]
mod prep_tests {
    use approx::assert_relative_eq;
    use tm_core::SimRng;
    use tm_person::PrepStatus;

    use super::person;
    use crate::PrepUptake;

    #[test]
    fn initiation_rate_formula() {
        let uptake = PrepUptake::new(0.01, 0.5).unwrap();
        assert_relative_eq!(uptake.initiation_prob(), 0.01);
        let uptake = PrepUptake::new(0.02, 0.2).unwrap();
        assert_relative_eq!(uptake.initiation_prob(), 0.005);
    }

    #[test]
    fn full_coverage_is_rejected() {
        assert!(PrepUptake::new(0.01, 1.0).is_err());
    }

    #[test]
    fn start_fixes_stop_time() {
        let uptake = PrepUptake::new(1.0, 0.5).unwrap();
        let mut rng = SimRng::new(0);
        let mut p = person(0, 20.0);
        let stop = uptake.try_start(&mut p, 10.0, &mut rng);
        assert_relative_eq!(stop.unwrap(), 11.1, epsilon = 1e-9);
        assert_eq!(p.prep.status, PrepStatus::On);
        assert_eq!(p.prep.start_time, 10.0);
        assert_eq!(Some(p.prep.stop_time), stop);
    }

    #[test]
    fn already_on_prep_consumes_no_draw() {
        let uptake = PrepUptake::new(1.0, 0.5).unwrap();
        let mut rng = SimRng::new(0);
        let mut p = person(0, 20.0);
        p.go_on_prep(1.0, 50.0);
        let mut shadow = rng.clone();
        assert_eq!(uptake.try_start(&mut p, 10.0, &mut rng), None);
        assert_eq!(p.prep.stop_time, 50.0);
        assert_eq!(rng.uniform(), shadow.uniform());
    }
}

#[cfg(test)]
mod mortality_tests {
    use tm_core::{SimRng, TimeStep};

    use super::person;
    use crate::{AgeBinMortality, CauseOfDeath, MortalityBin, PartnershipEnd};

    fn bins(p: f64) -> AgeBinMortality {
        AgeBinMortality::new(vec![
            MortalityBin { lower: 35.0, upper: None, prob: p },
            MortalityBin { lower: 15.0, upper: Some(35.0), prob: p },
        ])
        .unwrap()
    }

    #[test]
    fn bin_lookup_with_open_end() {
        let m = bins(0.25);
        assert_eq!(m.probability(10.0), 0.0);
        assert_eq!(m.probability(15.0), 0.25);
        assert_eq!(m.probability(90.0), 0.25);
    }

    #[test]
    fn invalid_bins() {
        let gap = vec![
            MortalityBin { lower: 15.0, upper: Some(25.0), prob: 0.1 },
            MortalityBin { lower: 30.0, upper: None, prob: 0.1 },
        ];
        assert!(AgeBinMortality::new(gap).is_err());
        let open_first = vec![
            MortalityBin { lower: 15.0, upper: None, prob: 0.1 },
            MortalityBin { lower: 30.0, upper: Some(40.0), prob: 0.1 },
        ];
        assert!(AgeBinMortality::new(open_first).is_err());
    }

    #[test]
    fn age_beats_infection_beats_background() {
        let m = bins(1.0);
        let mut rng = SimRng::new(0);

        let old = person(0, 70.0);
        assert_eq!(m.cause_of_death(&old, 65.0, &mut rng), CauseOfDeath::Age);

        let mut sick = person(1, 30.0);
        sick.infect(1.0, 0.0);
        sick.step(TimeStep::default());
        assert_eq!(m.cause_of_death(&sick, 65.0, &mut rng), CauseOfDeath::Infection);

        let healthy = person(2, 30.0);
        assert_eq!(m.cause_of_death(&healthy, 65.0, &mut rng), CauseOfDeath::Asm);
    }

    #[test]
    fn background_draw_only_when_needed() {
        let m = bins(0.0);
        let mut rng = SimRng::new(4);
        let mut shadow = rng.clone();

        let old = person(0, 70.0);
        assert_eq!(m.cause_of_death(&old, 65.0, &mut rng), CauseOfDeath::Age);
        assert_eq!(rng.clone().uniform(), shadow.clone().uniform());

        let healthy = person(1, 30.0);
        assert_eq!(m.cause_of_death(&healthy, 65.0, &mut rng), CauseOfDeath::None);
        shadow.uniform();
        assert_eq!(rng.uniform(), shadow.uniform());
    }

    #[test]
    fn partnership_end_mapping() {
        assert_eq!(CauseOfDeath::Age.partnership_end(), PartnershipEnd::AgingOut);
        assert_eq!(CauseOfDeath::Asm.partnership_end(), PartnershipEnd::DeathAsm);
        assert_eq!(CauseOfDeath::Infection.partnership_end(), PartnershipEnd::DeathInfection);
    }

    #[test]
    #[should_panic(expected = "CauseOfDeath::None")]
    fn no_partnership_end_for_the_living() {
        CauseOfDeath::None.partnership_end();
    }
}
