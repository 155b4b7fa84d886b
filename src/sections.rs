//! Fixed catalog of dashboard sections and their permission codes.
//!
//! Code 0 is reserved for global access and never appears here. The catalog
//! order is the sidebar order.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Stadium,
    Museum,
    Retail,
    Hospitality,
}

pub const ALL_SECTIONS: [Section; 4] = [Section::Stadium, Section::Museum, Section::Retail, Section::Hospitality];

impl Section {
    /// Permission code granting access to exactly this section.
    pub fn code(self) -> u32 {
        match self {
            Section::Stadium => 1,
            Section::Museum => 2,
            Section::Retail => 3,
            Section::Hospitality => 4,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Section::Stadium => "estadio",
            Section::Museum => "museo",
            Section::Retail => "deportiendas",
            Section::Hospitality => "hosteleria",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Section::Stadium => "ESTADIO ABANCA-RIAZOR",
            Section::Museum => "MUSEO RCD",
            Section::Retail => "DÉPOR TIENDAS",
            Section::Hospitality => "DÉPOR HOSTELERIA",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Section::Stadium => "/assets/Indice/Estadio ABANCA-RIAZOR.png",
            Section::Museum => "/assets/Indice/Museo.png",
            Section::Retail => "/assets/Indice/DeporTienda.png",
            Section::Hospitality => "/assets/Indice/Depor_Hosteleria.png",
        }
    }

    /// Landing page for the sidebar link. The stadium section lands on its
    /// first tab rather than a bare section root.
    pub fn href(self) -> &'static str {
        match self {
            Section::Stadium => "/estadio/entradas",
            Section::Museum => "/museo",
            Section::Retail => "/deportiendas",
            Section::Hospitality => "/hosteleria",
        }
    }

    /// Path prefix used to mark the sidebar entry active.
    pub fn path_prefix(self) -> &'static str {
        match self {
            Section::Stadium => "/estadio",
            Section::Museum => "/museo",
            Section::Retail => "/deportiendas",
            Section::Hospitality => "/hosteleria",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Section> {
        ALL_SECTIONS.iter().copied().find(|s| s.slug() == slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_unique_and_nonzero() {
        let mut codes: Vec<u32> = ALL_SECTIONS.iter().map(|s| s.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), ALL_SECTIONS.len());
        assert!(codes.iter().all(|&c| c != 0));
    }

    #[test]
    fn slug_roundtrip() {
        for s in ALL_SECTIONS {
            assert_eq!(Section::from_slug(s.slug()), Some(s));
        }
        assert_eq!(Section::from_slug("nope"), None);
    }
}
