//! MVP / watchlist selection over the current agent roster.
//!
//! Pure functions of the agent list, recomputed on every call and never
//! cached, so every call site agrees bit-for-bit.

use uuid::Uuid;

use crate::models::{Agent, AgentStatus};

/// The computed honors for the current mission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Honors {
    pub mvp: Vec<Uuid>,
    pub watchlist: Vec<Uuid>,
}

/// Computes MVP and watchlist sets from per-mission award/reprimand
/// deltas. Only `active` agents are considered; with no active agents
/// both sets are empty.
pub fn select_honors(agents: &[Agent]) -> Honors {
    let active: Vec<&Agent> = agents
        .iter()
        .filter(|a| a.status == AgentStatus::Active)
        .collect();
    if active.is_empty() {
        return Honors::default();
    }

    let watchlist = select_watchlist(&active);
    let mvp = select_mvp(&active, &watchlist);
    Honors { mvp, watchlist }
}

/// Highest reprimand delta wins the watchlist; ties break toward the
/// minimum award delta, and a remaining tie keeps everyone tied. When
/// nobody has been reprimanded this mission, the whole active roster is
/// on watch.
fn select_watchlist(active: &[&Agent]) -> Vec<Uuid> {
    if active.iter().all(|a| a.reprimands_delta == 0) {
        return active.iter().map(|a| a.id).collect();
    }

    let max_reprimands = active
        .iter()
        .map(|a| a.reprimands_delta)
        .max()
        .unwrap_or(0);
    let candidates: Vec<&Agent> = active
        .iter()
        .copied()
        .filter(|a| a.reprimands_delta == max_reprimands)
        .collect();
    if candidates.len() == 1 {
        return vec![candidates[0].id];
    }

    let min_awards = candidates
        .iter()
        .map(|a| a.awards_delta)
        .min()
        .unwrap_or(0);
    candidates
        .iter()
        .filter(|a| a.awards_delta == min_awards)
        .map(|a| a.id)
        .collect()
}

/// MVP is picked among active agents *not* on the watchlist: highest
/// award delta, ties broken toward the minimum reprimand delta. No MVP
/// when nobody earned an award this mission or the watchlist swallowed
/// everyone.
fn select_mvp(active: &[&Agent], watchlist: &[Uuid]) -> Vec<Uuid> {
    let remaining: Vec<&Agent> = active
        .iter()
        .copied()
        .filter(|a| !watchlist.contains(&a.id))
        .collect();
    if remaining.is_empty() || active.iter().all(|a| a.awards_delta == 0) {
        return Vec::new();
    }

    let max_awards = remaining.iter().map(|a| a.awards_delta).max().unwrap_or(0);
    let candidates: Vec<&Agent> = remaining
        .iter()
        .copied()
        .filter(|a| a.awards_delta == max_awards)
        .collect();
    if candidates.len() == 1 {
        return vec![candidates[0].id];
    }

    let min_reprimands = candidates
        .iter()
        .map(|a| a.reprimands_delta)
        .min()
        .unwrap_or(0);
    candidates
        .iter()
        .filter(|a| a.reprimands_delta == min_reprimands)
        .map(|a| a.id)
        .collect()
}
