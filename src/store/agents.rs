use uuid::Uuid;

use crate::models::{Agent, AgentInput};

fn from_input(id: Uuid, input: AgentInput) -> Agent {
    Agent {
        id,
        codename: input.codename,
        arc_origin: input.arc_origin,
        arc_current: input.arc_current,
        arc_ambition: input.arc_ambition,
        qa: input.qa.clamped(),
        awards: input.awards,
        reprimands: input.reprimands,
        awards_delta: input.awards_delta,
        reprimands_delta: input.reprimands_delta,
        status: input.status,
        equipment_claims: input.equipment_claims,
    }
}

pub(super) fn create(agents: &mut Vec<Agent>, input: AgentInput) -> Uuid {
    let id = Uuid::new_v4();
    agents.push(from_input(id, input));
    id
}

pub(super) fn update(agents: &mut [Agent], id: Uuid, input: AgentInput) {
    if let Some(agent) = agents.iter_mut().find(|a| a.id == id) {
        *agent = from_input(id, input);
    }
}

pub(super) fn delete(agents: &mut Vec<Agent>, id: Uuid) {
    agents.retain(|a| a.id != id);
}

/// Folds `awards_delta` into `awards` and `reprimands_delta` into
/// `reprimands`, zeroing both deltas. Counts and deltas move together;
/// no agent is ever left with updated counts and stale deltas.
pub(super) fn settle_deltas(agents: &mut [Agent]) {
    for agent in agents.iter_mut() {
        agent.awards += agent.awards_delta;
        agent.reprimands += agent.reprimands_delta;
        agent.awards_delta = 0;
        agent.reprimands_delta = 0;
    }
}
