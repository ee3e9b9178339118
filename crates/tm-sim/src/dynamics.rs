//! Network dynamics seam.
//!
//! Partnership formation and dissolution is driven from outside the disease
//! model.  At the start of every step the model hands its implementation of
//! [`NetworkDynamics`] an [`EdgeEditor`]; edges added through the editor get
//! their condom-use category drawn on the way in, exactly like edges of the
//! initial network.

use tm_core::{EdgeId, PersonId, SimRng};
use tm_disease::{CondomUseAssigner, PartnershipType};
use tm_network::{ContactNetwork, Edge, EdgeType};
use tm_person::Population;

use crate::{SimError, SimResult};

/// Mutable view of the contact network handed to [`NetworkDynamics::update`].
pub struct EdgeEditor<'a> {
    pub(crate) network:    &'a mut ContactNetwork,
    pub(crate) population: &'a Population,
    pub(crate) condoms:    &'a CondomUseAssigner,
    pub(crate) rng:        &'a mut SimRng,
}

impl<'a> EdgeEditor<'a> {
    pub fn network(&self) -> &ContactNetwork {
        self.network
    }

    pub fn population(&self) -> &Population {
        self.population
    }

    /// The shared random stream.  Draws taken here come before every other
    /// draw of the step.
    pub fn rng(&mut self) -> &mut SimRng {
        self.rng
    }

    /// Form a partnership and draw its condom-use category.
    pub fn add_edge(&mut self, v1: PersonId, v2: PersonId, kind: EdgeType) -> SimResult<EdgeId> {
        add_edge(self.network, self.population, self.condoms, self.rng, v1, v2, kind)
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> SimResult<Edge> {
        Ok(self.network.remove_edge(id)?)
    }
}

/// Add `v1 → v2` to `network` with a condom-use category for the pair's
/// current concordance.  Consumes one draw.
pub(crate) fn add_edge(
    network: &mut ContactNetwork,
    population: &Population,
    condoms: &CondomUseAssigner,
    rng: &mut SimRng,
    v1: PersonId,
    v2: PersonId,
    kind: EdgeType,
) -> SimResult<EdgeId> {
    let a = population.get(v1).ok_or(SimError::UnknownPerson(v1))?;
    let b = population.get(v2).ok_or(SimError::UnknownPerson(v2))?;
    let ptype = PartnershipType::of(a.is_infected(), b.is_infected());
    let condom = condoms.init_edge(ptype, kind, rng);
    Ok(network.add_edge(v1, v2, kind, condom)?)
}

/// External driver of the contact network.
pub trait NetworkDynamics {
    /// Apply this tick's partnership changes.  Runs first in every step.
    fn update(&mut self, _tick: f64, _editor: &mut EdgeEditor<'_>) -> SimResult<()> {
        Ok(())
    }

    /// Population-size correction for the formation term of `kind`:
    /// `ln(previous_size) - ln(current_size)`, applied after every step in
    /// which both sizes are positive.
    fn adjust_theta(&mut self, _kind: EdgeType, _delta: f64) {}
}

/// Dynamics that leave the network untouched.
#[derive(Copy, Clone, Debug, Default)]
pub struct StaticNetwork;

impl NetworkDynamics for StaticNetwork {}
