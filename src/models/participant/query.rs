//! Search, ordering, and report filtering over the roster.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::catalog::{Departamento, Tipo};
use super::types::Participant;

/// Value used by the report dropdowns to mean "no restriction".
pub const TODOS: &str = "Todos";

/// Case- and diacritic-insensitive comparison key: NFD, combining marks
/// dropped, lowercased.
pub fn fold(input: &str) -> String {
    input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Name ordering: folded first, then case-insensitive, then exact, so the
/// order is total and stable across snapshots.
pub fn compare_nombre(a: &str, b: &str) -> Ordering {
    fold(a)
        .cmp(&fold(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

pub fn sort_by_nombre(participants: &mut [Participant]) {
    participants.sort_by(|a, b| compare_nombre(&a.nombre, &b.nombre).then_with(|| a.id.cmp(&b.id)));
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    fold(haystack).contains(needle)
}

/// Roster search: name, or phone in stored or grouped form.
pub fn matches_search(p: &Participant, query: &str) -> bool {
    let needle = fold(query.trim());
    if needle.is_empty() {
        return true;
    }
    contains_folded(&p.nombre, &needle)
        || p.telefono.contains(&needle)
        || p.telefono_display().contains(&needle)
}

/// Subset matching `query`; an empty query yields everything. Input order is kept.
pub fn search(participants: &[Participant], query: &str) -> Vec<Participant> {
    participants
        .iter()
        .filter(|p| matches_search(p, query))
        .cloned()
        .collect()
}

/// Attendance dimension of the report filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FiltroAsistencia {
    #[default]
    Todos,
    Presentes,
    Ausentes,
}

impl FiltroAsistencia {
    pub const ALL: [FiltroAsistencia; 3] = [
        FiltroAsistencia::Todos,
        FiltroAsistencia::Presentes,
        FiltroAsistencia::Ausentes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FiltroAsistencia::Todos => "Todos",
            FiltroAsistencia::Presentes => "Presentes",
            FiltroAsistencia::Ausentes => "Ausentes",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "Presentes" => FiltroAsistencia::Presentes,
            "Ausentes" => FiltroAsistencia::Ausentes,
            _ => FiltroAsistencia::Todos,
        }
    }

    fn accepts(self, p: &Participant) -> bool {
        match self {
            FiltroAsistencia::Todos => true,
            FiltroAsistencia::Presentes => p.is_present(),
            FiltroAsistencia::Ausentes => !p.is_present(),
        }
    }
}

/// Query-string form of the report filter.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReportQuery {
    pub tipo: Option<String>,
    pub departamento: Option<String>,
    pub asistencia: Option<String>,
    pub q: Option<String>,
}

/// One catalog dimension of the report filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion<T> {
    Any,
    Is(T),
    /// A value outside the catalog. Matches no row.
    Unknown(String),
}

impl<T> Default for Criterion<T> {
    fn default() -> Self {
        Criterion::Any
    }
}

impl<T: Copy + PartialEq> Criterion<T> {
    fn parse(raw: Option<&str>, from_label: impl Fn(&str) -> Option<T>) -> Self {
        match raw.map(str::trim).filter(|s| !s.is_empty() && *s != TODOS) {
            None => Criterion::Any,
            Some(s) => from_label(s)
                .map(Criterion::Is)
                .unwrap_or_else(|| Criterion::Unknown(s.to_string())),
        }
    }

    fn accepts(&self, value: T) -> bool {
        match self {
            Criterion::Any => true,
            Criterion::Is(t) => *t == value,
            Criterion::Unknown(_) => false,
        }
    }

    fn value(&self, label: impl Fn(T) -> &'static str) -> &str {
        match self {
            Criterion::Any => TODOS,
            Criterion::Is(t) => label(*t),
            Criterion::Unknown(raw) => raw.as_str(),
        }
    }
}

/// Three-way intersection over tipo, departamento, and attendance, further
/// narrowed by free text over name, phone, and departamento.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
    pub tipo: Criterion<Tipo>,
    pub departamento: Criterion<Departamento>,
    pub asistencia: FiltroAsistencia,
    pub busqueda: String,
}

impl ReportFilter {
    /// Build from query parameters. Empty and `Todos` leave that dimension
    /// unrestricted; a value outside the catalog matches nothing.
    pub fn from_query(q: &ReportQuery) -> Self {
        ReportFilter {
            tipo: Criterion::parse(q.tipo.as_deref(), Tipo::from_label),
            departamento: Criterion::parse(q.departamento.as_deref(), Departamento::from_label),
            asistencia: q
                .asistencia
                .as_deref()
                .map(FiltroAsistencia::parse)
                .unwrap_or_default(),
            busqueda: q.q.clone().unwrap_or_default(),
        }
    }

    pub fn matches(&self, p: &Participant) -> bool {
        if !self.tipo.accepts(p.tipo) || !self.departamento.accepts(p.departamento) {
            return false;
        }
        if !self.asistencia.accepts(p) {
            return false;
        }
        let needle = fold(self.busqueda.trim());
        needle.is_empty()
            || contains_folded(&p.nombre, &needle)
            || p.telefono.contains(&needle)
            || p.telefono_display().contains(&needle)
            || contains_folded(p.departamento.as_str(), &needle)
    }

    /// Filtered rows, ordered by name.
    pub fn apply(&self, participants: &[Participant]) -> Vec<Participant> {
        let mut rows: Vec<Participant> = participants
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();
        sort_by_nombre(&mut rows);
        rows
    }

    pub fn tipo_value(&self) -> &str {
        self.tipo.value(Tipo::as_str)
    }

    pub fn departamento_value(&self) -> &str {
        self.departamento.value(Departamento::as_str)
    }
}

/// `Todos` followed by each tipo observed in the roster, first-seen order.
pub fn tipo_options(participants: &[Participant]) -> Vec<String> {
    let mut out = vec![TODOS.to_string()];
    for p in participants {
        let label = p.tipo.as_str();
        if !out.iter().any(|o| o == label) {
            out.push(label.to_string());
        }
    }
    out
}

/// `Todos` followed by each departamento observed in the roster, first-seen order.
pub fn departamento_options(participants: &[Participant]) -> Vec<String> {
    let mut out = vec![TODOS.to_string()];
    for p in participants {
        let label = p.departamento.as_str();
        if !out.iter().any(|o| o == label) {
            out.push(label.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_strips_accents_and_case() {
        assert_eq!(fold("José PÉREZ"), "jose perez");
        assert_eq!(fold("Peña"), "pena");
    }

    #[test]
    fn compare_is_case_insensitive() {
        assert_eq!(compare_nombre("ana", "Bea"), Ordering::Less);
        assert_eq!(compare_nombre("Álvaro", "Beto"), Ordering::Less);
        assert_eq!(compare_nombre("zoe", "Ana"), Ordering::Greater);
    }

    #[test]
    fn criterion_keeps_unknown_values() {
        assert_eq!(Criterion::parse(Some(" Todos "), Tipo::from_label), Criterion::Any);
        assert_eq!(Criterion::parse(None, Tipo::from_label), Criterion::Any);
        assert_eq!(Criterion::parse(Some("Cliente"), Tipo::from_label), Criterion::Is(Tipo::Cliente));
        let unknown = Criterion::parse(Some("cliente"), Tipo::from_label);
        assert_eq!(unknown, Criterion::Unknown("cliente".to_string()));
        assert!(!unknown.accepts(Tipo::Cliente));
        assert_eq!(unknown.value(Tipo::as_str), "cliente");
    }

    #[test]
    fn filtro_asistencia_parse_defaults_to_todos() {
        assert_eq!(FiltroAsistencia::parse("Presentes"), FiltroAsistencia::Presentes);
        assert_eq!(FiltroAsistencia::parse("whatever"), FiltroAsistencia::Todos);
    }
}
