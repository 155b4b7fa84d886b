//! Shared team-crest lookup and match-result classification.
//!
//! The legacy pages each carried their own copy of the crest map; here it is
//! one immutable table built once at startup. Keys cover every alias the feed
//! uses for a club (short name, sponsored name, full name).

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static CREST_FILES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Albacete", "Albacete BP.png"),
        ("Albacete BP", "Albacete BP.png"),
        ("Atlético de Madrid", "Atletico de Madrid.png"),
        ("Atletico de Madrid", "Atletico de Madrid.png"),
        ("Burgos", "Burgos CF.png"),
        ("Burgos CF", "Burgos CF.png"),
        ("Castellón", "CD Castellón.png"),
        ("CD Castellón", "CD Castellón.png"),
        ("Leganés", "CD Leganés.png"),
        ("CD Leganés", "CD Leganés.png"),
        ("Mirandés", "CD Mirandés.png"),
        ("CD Mirandés", "CD Mirandés.png"),
        ("Ceuta", "Ceuta.png"),
        ("AD Ceuta", "Ceuta.png"),
        ("AD Ceuta FC", "Ceuta.png"),
        ("Cultural Leonesa", "Cultural.png"),
        ("Cultural", "Cultural.png"),
        ("Cádiz", "Cádiz CF.png"),
        ("Cádiz CF", "Cádiz CF.png"),
        ("Córdoba", "Córdoba CF.png"),
        ("Córdoba CF", "Córdoba CF.png"),
        ("Andorra", "FC Andorra.png"),
        ("FC Andorra", "FC Andorra.png"),
        ("Granada", "Granada CF.png"),
        ("Granada CF", "Granada CF.png"),
        ("Le Havre", "Le Havre.png"),
        ("Mallorca", "Mallorca.png"),
        ("RCD Mallorca", "Mallorca.png"),
        ("Málaga", "Málaga CF.png"),
        ("Málaga CF", "Málaga CF.png"),
        ("Deportivo", "RC Deportivo.png"),
        ("RC Deportivo", "RC Deportivo.png"),
        ("Deportivo de La Coruña", "RC Deportivo.png"),
        ("Racing", "Real Racing Club.png"),
        ("Racing de Santander", "Real Racing Club.png"),
        ("Real Racing Club", "Real Racing Club.png"),
        ("Real Sociedad B", "Real Sociedad B.png"),
        ("Real Sociedad II", "Real Sociedad B.png"),
        ("Sporting", "Real Sporting.png"),
        ("Real Sporting", "Real Sporting.png"),
        ("Sporting de Gijón", "Real Sporting.png"),
        ("Valladolid", "Real Valladolid CF.png"),
        ("Real Valladolid", "Real Valladolid CF.png"),
        ("Real Valladolid CF", "Real Valladolid CF.png"),
        ("Zaragoza", "Real Zaragoza.png"),
        ("Real Zaragoza", "Real Zaragoza.png"),
        ("Eibar", "SD Eibar.png"),
        ("SD Eibar", "SD Eibar.png"),
        ("Huesca", "SD Huesca.png"),
        ("SD Huesca", "SD Huesca.png"),
        ("Almería", "UD Almería.png"),
        ("UD Almería", "UD Almería.png"),
        ("Las Palmas", "UD Las Palmas.png"),
        ("UD Las Palmas", "UD Las Palmas.png"),
    ])
});

/// Asset path for a team's crest, or None for unknown teams (friendlies,
/// freshly promoted sides the asset pack lacks).
pub fn crest_path(team_name: &str) -> Option<String> {
    CREST_FILES.get(team_name).map(|f| format!("/assets/Escudos/{}", f))
}

/// Match result from the home side's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    Win,
    Draw,
    Loss,
    Unknown,
}

impl MatchOutcome {
    /// Parse a "home-away" score string such as "2-1".
    pub fn from_result(result: &str) -> MatchOutcome {
        let mut parts = result.split('-');
        let home = parts.next().and_then(|s| s.trim().parse::<i32>().ok());
        let away = parts.next().and_then(|s| s.trim().parse::<i32>().ok());
        match (home, away) {
            (Some(h), Some(a)) if h > a => MatchOutcome::Win,
            (Some(h), Some(a)) if h < a => MatchOutcome::Loss,
            (Some(_), Some(_)) => MatchOutcome::Draw,
            _ => MatchOutcome::Unknown,
        }
    }

    /// Decoration colour for the result ring under each bar.
    pub fn color(self) -> &'static str {
        match self {
            MatchOutcome::Win => "#2ecc71",
            MatchOutcome::Loss => "#e74c3c",
            MatchOutcome::Draw => "#f39c12",
            MatchOutcome::Unknown => "#95a5a6",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_the_same_crest() {
        assert_eq!(crest_path("Racing"), crest_path("Racing de Santander"));
        assert_eq!(crest_path("Sporting"), Some("/assets/Escudos/Real Sporting.png".to_string()));
        assert_eq!(crest_path("AFC Wimbledon"), None);
    }

    #[test]
    fn result_classification() {
        assert_eq!(MatchOutcome::from_result("2-1"), MatchOutcome::Win);
        assert_eq!(MatchOutcome::from_result("0-0"), MatchOutcome::Draw);
        assert_eq!(MatchOutcome::from_result("1-3"), MatchOutcome::Loss);
        assert_eq!(MatchOutcome::from_result(""), MatchOutcome::Unknown);
        assert_eq!(MatchOutcome::from_result("abandoned"), MatchOutcome::Unknown);
        assert_eq!(MatchOutcome::from_result("1-3").color(), "#e74c3c");
    }
}
