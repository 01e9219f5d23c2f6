use uuid::Uuid;

use crate::models::{Anomaly, AnomalyInput};

fn from_input(id: Uuid, input: AnomalyInput) -> Anomaly {
    Anomaly {
        id,
        codename: input.codename,
        focus: input.focus,
        domain: input.domain,
        status: input.status,
    }
}

pub(super) fn create(anomalies: &mut Vec<Anomaly>, input: AnomalyInput) -> Uuid {
    let id = Uuid::new_v4();
    anomalies.push(from_input(id, input));
    id
}

pub(super) fn update(anomalies: &mut [Anomaly], id: Uuid, input: AnomalyInput) {
    if let Some(anomaly) = anomalies.iter_mut().find(|a| a.id == id) {
        *anomaly = from_input(id, input);
    }
}

pub(super) fn delete(anomalies: &mut Vec<Anomaly>, id: Uuid) {
    anomalies.retain(|a| a.id != id);
}
