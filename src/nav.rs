//! Permission-to-navigation mapping: which sidebar entries a session sees.

use serde::{Deserialize, Serialize};

use crate::identity::PermissionSet;
use crate::sections::{Section, ALL_SECTIONS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavEntry {
    pub id: String,
    pub label: String,
    pub href: String,
    pub icon: Option<String>,
    pub active: bool,
}

/// Ordered sidebar entries for a session. Home is always first; a global
/// permission set reveals every section, otherwise only sections whose code
/// is present. The entry matching the current path is marked active.
pub fn visible_entries(perms: &PermissionSet, current_path: &str) -> Vec<NavEntry> {
    let path = if current_path.is_empty() { "/" } else { current_path };
    let mut entries = vec![NavEntry {
        id: "nav-inicio".to_string(),
        label: "INICIO".to_string(),
        href: "/".to_string(),
        icon: None,
        active: path == "/",
    }];
    for section in ALL_SECTIONS {
        if perms.allows(section) {
            entries.push(entry_for(section, path));
        }
    }
    entries
}

fn entry_for(section: Section, path: &str) -> NavEntry {
    NavEntry {
        id: format!("nav-{}", section.slug()),
        label: section.label().to_string(),
        href: section.href().to_string(),
        icon: Some(section.icon().to_string()),
        active: path.starts_with(section.path_prefix()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_is_always_first() {
        let entries = visible_entries(&PermissionSet::parse(""), "/");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "nav-inicio");
        assert!(entries[0].active);
    }

    #[test]
    fn global_set_reveals_all_sections_in_order() {
        let entries = visible_entries(&PermissionSet::global(), "/deportiendas");
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["nav-inicio", "nav-estadio", "nav-museo", "nav-deportiendas", "nav-hosteleria"]);
        assert!(entries.iter().find(|e| e.id == "nav-deportiendas").unwrap().active);
        assert!(!entries[0].active);
    }

    #[test]
    fn section_visible_iff_code_present() {
        let entries = visible_entries(&PermissionSet::parse("4"), "/");
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["nav-inicio", "nav-hosteleria"]);
    }

    #[test]
    fn stadium_sub_pages_mark_the_stadium_entry_active() {
        let entries = visible_entries(&PermissionSet::global(), "/estadio/cesiones");
        let estadio = entries.iter().find(|e| e.id == "nav-estadio").unwrap();
        assert!(estadio.active);
        assert_eq!(estadio.href, "/estadio/entradas");
    }
}
