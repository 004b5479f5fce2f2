/// Map a license display name to its SPDX identifier, if it is a known alias.
///
/// Covers the names the inventory service commonly reports for standard
/// licenses ("Apache License 2.0", "MIT License", ...).
pub fn normalize(raw: &str) -> Option<&'static str> {
    let id = match raw.trim() {
        "Apache 2.0" | "Apache License 2.0" | "Apache License, Version 2.0" => "Apache-2.0",
        "MIT License" | "The MIT License" => "MIT",
        "BSD 2-clause \"Simplified\" License" | "BSD 2-Clause" | "Simplified BSD" => {
            "BSD-2-Clause"
        }
        "BSD 3-clause \"New\" or \"Revised\" License" | "BSD 3-Clause" | "New BSD"
        | "Modified BSD" => "BSD-3-Clause",
        "GNU General Public License v2.0 only" | "GNU GPL v2" | "GPLv2" => "GPL-2.0-only",
        "GNU General Public License v2.0 or later" => "GPL-2.0-or-later",
        "GNU General Public License v3.0 only" | "GNU GPL v3" | "GPLv3" => "GPL-3.0-only",
        "GNU General Public License v3.0 or later" => "GPL-3.0-or-later",
        "GNU Lesser General Public License v2.1 only" | "GNU LGPL v2.1" | "LGPLv2.1" => {
            "LGPL-2.1-only"
        }
        "GNU Lesser General Public License v2.1 or later" => "LGPL-2.1-or-later",
        "GNU Lesser General Public License v3.0 only" | "GNU LGPL v3" | "LGPLv3" => {
            "LGPL-3.0-only"
        }
        "GNU Lesser General Public License v3.0 or later" => "LGPL-3.0-or-later",
        "GNU Affero General Public License v3.0 only" | "GNU AGPL v3" | "AGPLv3" => {
            "AGPL-3.0-only"
        }
        "Mozilla Public License 2.0" | "MPL 2.0" | "MPLv2" => "MPL-2.0",
        "Eclipse Public License 1.0" => "EPL-1.0",
        "Eclipse Public License 2.0" => "EPL-2.0",
        "ISC License" => "ISC",
        "Creative Commons Zero v1.0 Universal" | "CC0" => "CC0-1.0",
        "zlib License" => "Zlib",
        "The Unlicense" => "Unlicense",
        _ => return None,
    };
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_known_names() {
        assert_eq!(normalize("MIT License"), Some("MIT"));
        assert_eq!(normalize("Apache License 2.0"), Some("Apache-2.0"));
        assert_eq!(normalize(" ISC License "), Some("ISC"));
    }

    #[test]
    fn test_normalize_unknown_name() {
        assert_eq!(normalize("Proprietary-XYZ"), None);
        assert_eq!(normalize("MIT"), None);
    }
}
