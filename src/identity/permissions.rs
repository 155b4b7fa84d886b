use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::sections::Section;

/// Code granting unrestricted access to every section.
pub const GLOBAL_CODE: u32 = 0;

/// Parsed permission codes for a user. Stored in the database as a
/// comma-separated string ("0", "1,3", ...); unparseable fragments are
/// dropped rather than failing the whole login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    codes: BTreeSet<u32>,
}

impl PermissionSet {
    pub fn parse(raw: &str) -> Self {
        let codes = raw
            .split(',')
            .filter_map(|p| p.trim().parse::<u32>().ok())
            .collect();
        PermissionSet { codes }
    }

    pub fn global() -> Self {
        PermissionSet { codes: [GLOBAL_CODE].into_iter().collect() }
    }

    pub fn is_global(&self) -> bool {
        self.codes.contains(&GLOBAL_CODE)
    }

    /// A section is visible with the global code or its own code.
    pub fn allows(&self, section: Section) -> bool {
        self.is_global() || self.codes.contains(&section.code())
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Canonical comma-separated form, mirroring the storage format.
    pub fn to_storage(&self) -> String {
        self.codes.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::ALL_SECTIONS;

    #[test]
    fn global_code_sees_everything() {
        let perms = PermissionSet::parse("0,3");
        for s in ALL_SECTIONS {
            assert!(perms.allows(s), "global set must allow {:?}", s);
        }
    }

    #[test]
    fn specific_codes_see_only_their_section() {
        let perms = PermissionSet::parse("1, 4");
        for s in ALL_SECTIONS {
            assert_eq!(perms.allows(s), s.code() == 1 || s.code() == 4);
        }
    }

    #[test]
    fn junk_fragments_are_dropped() {
        let perms = PermissionSet::parse("2,x,, -1");
        assert!(!perms.is_global());
        assert_eq!(perms.to_storage(), "2");
    }

    #[test]
    fn empty_set_sees_nothing() {
        let perms = PermissionSet::parse("");
        assert!(perms.is_empty());
        for s in ALL_SECTIONS {
            assert!(!perms.allows(s));
        }
    }
}
