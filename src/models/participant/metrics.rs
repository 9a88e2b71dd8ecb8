//! Aggregate attendance figures. Pure functions over a roster slice.

use serde::Serialize;

use super::catalog::Departamento;
use super::types::Participant;

/// `round(part / total * 100)`, half rounding up, and 0 when `total` is 0.
pub fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part * 200 + total) / (2 * total)) as u32
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breakdown {
    pub label: String,
    pub total: usize,
    pub asistieron: usize,
    pub porcentaje: u32,
}

impl Breakdown {
    fn new(label: &str) -> Self {
        Breakdown {
            label: label.to_string(),
            total: 0,
            asistieron: 0,
            porcentaje: 0,
        }
    }

    fn count(&mut self, present: bool) {
        self.total += 1;
        if present {
            self.asistieron += 1;
        }
    }

    fn finish(mut self) -> Self {
        self.porcentaje = percentage(self.asistieron, self.total);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub total: usize,
    pub presentes: usize,
    pub ausentes: usize,
    pub porcentaje: u32,
    /// One entry per observed tipo, in first-seen order.
    pub por_tipo: Vec<Breakdown>,
    /// Every departamento in catalog order, zero-filled.
    pub por_departamento: Vec<Breakdown>,
}

impl Metrics {
    pub fn compute(participants: &[Participant]) -> Self {
        let total = participants.len();
        let presentes = participants.iter().filter(|p| p.is_present()).count();

        let mut por_tipo: Vec<Breakdown> = Vec::new();
        for p in participants {
            let label = p.tipo.as_str();
            match por_tipo.iter_mut().find(|b| b.label == label) {
                Some(b) => b.count(p.is_present()),
                None => {
                    let mut b = Breakdown::new(label);
                    b.count(p.is_present());
                    por_tipo.push(b);
                }
            }
        }

        let mut por_departamento: Vec<Breakdown> = Departamento::ALL
            .iter()
            .map(|d| Breakdown::new(d.as_str()))
            .collect();
        for p in participants {
            if let Some(idx) = Departamento::ALL.iter().position(|d| *d == p.departamento) {
                por_departamento[idx].count(p.is_present());
            }
        }

        Metrics {
            total,
            presentes,
            ausentes: total - presentes,
            porcentaje: percentage(presentes, total),
            por_tipo: por_tipo.into_iter().map(Breakdown::finish).collect(),
            por_departamento: por_departamento.into_iter().map(Breakdown::finish).collect(),
        }
    }

    /// Region breakdown ordered for display: most attendees first, catalog
    /// order among ties.
    pub fn departamentos_ranked(&self) -> Vec<Breakdown> {
        let mut ranked = self.por_departamento.clone();
        ranked.sort_by(|a, b| b.asistieron.cmp(&a.asistieron));
        ranked
    }

    pub fn departamento(&self, label: &str) -> Option<&Breakdown> {
        self.por_departamento.iter().find(|b| b.label == label)
    }

    pub fn tipo(&self, label: &str) -> Option<&Breakdown> {
        self.por_tipo.iter().find(|b| b.label == label)
    }
}
