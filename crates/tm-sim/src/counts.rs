//! Per-tick aggregate counts.

use tm_network::EdgeType;

/// Counters accumulated over one tick and handed to the recorder at its end.
///
/// `overlaps` is `-1` when overlap counting is switched off.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickCounts {
    pub tick:                         f64,
    pub size:                         usize,
    pub main_edge_count:              usize,
    pub casual_edge_count:            usize,
    pub entries:                      u32,
    pub internal_infected:            u32,
    pub external_infected:            u32,
    pub infected_at_entry:            u32,
    pub uninfected:                   u32,
    pub age_deaths:                   u32,
    pub infection_deaths:             u32,
    pub asm_deaths:                   u32,
    pub overlaps:                     i64,
    pub sex_acts:                     u32,
    pub steady_sex_acts:              u32,
    pub casual_sex_acts:              u32,
    pub sd_steady_sex_with_condom:    u32,
    pub sd_steady_sex_without_condom: u32,
    pub sc_steady_sex_with_condom:    u32,
    pub sc_steady_sex_without_condom: u32,
    pub sd_casual_sex_with_condom:    u32,
    pub sd_casual_sex_without_condom: u32,
    pub sc_casual_sex_with_condom:    u32,
    pub sc_casual_sex_without_condom: u32,
}

impl TickCounts {
    /// Count one act on an edge of type `kind`.  `discordant` means exactly
    /// one partner was infected at the time of the act.
    pub fn record_sex_act(&mut self, kind: EdgeType, condom_used: bool, discordant: bool) {
        self.sex_acts += 1;
        let counter = match (kind, discordant, condom_used) {
            (EdgeType::Steady, true, true) => &mut self.sd_steady_sex_with_condom,
            (EdgeType::Steady, true, false) => &mut self.sd_steady_sex_without_condom,
            (EdgeType::Steady, false, true) => &mut self.sc_steady_sex_with_condom,
            (EdgeType::Steady, false, false) => &mut self.sc_steady_sex_without_condom,
            (EdgeType::Casual, true, true) => &mut self.sd_casual_sex_with_condom,
            (EdgeType::Casual, true, false) => &mut self.sd_casual_sex_without_condom,
            (EdgeType::Casual, false, true) => &mut self.sc_casual_sex_with_condom,
            (EdgeType::Casual, false, false) => &mut self.sc_casual_sex_without_condom,
        };
        *counter += 1;
        match kind {
            EdgeType::Steady => self.steady_sex_acts += 1,
            EdgeType::Casual => self.casual_sex_acts += 1,
        }
    }

    pub fn total_deaths(&self) -> u32 {
        self.age_deaths + self.infection_deaths + self.asm_deaths
    }

    /// Zero every counter for the next tick.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
