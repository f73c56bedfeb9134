//! Static vehicle and location lookup tables.

use serde::Serialize;

/// A selectable id with its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Make {
    pub value: &'static str,
    pub label: &'static str,
    pub models: &'static [Entry],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub value: &'static str,
    pub label: &'static str,
    #[serde(rename = "ref")]
    pub reference: &'static str,
}

const fn entry(value: &'static str, label: &'static str) -> Entry {
    Entry { value, label }
}

const fn location(value: &'static str, label: &'static str, reference: &'static str) -> Location {
    Location {
        value,
        label,
        reference,
    }
}

pub const MAKES: [Make; 14] = [
    Make {
        value: "toyota",
        label: "Toyota",
        models: &[
            entry("camry", "Camry"),
            entry("corolla", "Corolla"),
            entry("hilux", "HiLux"),
            entry("rav4", "RAV4"),
            entry("landcruiser", "LandCruiser"),
        ],
    },
    Make {
        value: "ford",
        label: "Ford",
        models: &[
            entry("ranger", "Ranger"),
            entry("focus", "Focus"),
            entry("mustang", "Mustang"),
            entry("everest", "Everest"),
        ],
    },
    Make {
        value: "holden",
        label: "Holden",
        models: &[
            entry("commodore", "Commodore"),
            entry("colorado", "Colorado"),
            entry("cruze", "Cruze"),
        ],
    },
    Make {
        value: "mazda",
        label: "Mazda",
        models: &[
            entry("cx5", "CX-5"),
            entry("mazda3", "Mazda3"),
            entry("bt50", "BT-50"),
            entry("cx9", "CX-9"),
        ],
    },
    Make {
        value: "hyundai",
        label: "Hyundai",
        models: &[
            entry("i30", "i30"),
            entry("tucson", "Tucson"),
            entry("santafe", "Santa Fe"),
        ],
    },
    Make {
        value: "kia",
        label: "Kia",
        models: &[
            entry("cerato", "Cerato"),
            entry("sportage", "Sportage"),
            entry("sorento", "Sorento"),
        ],
    },
    Make {
        value: "nissan",
        label: "Nissan",
        models: &[
            entry("navara", "Navara"),
            entry("xtrail", "X-Trail"),
            entry("patrol", "Patrol"),
        ],
    },
    Make {
        value: "honda",
        label: "Honda",
        models: &[
            entry("civic", "Civic"),
            entry("crv", "CR-V"),
            entry("accord", "Accord"),
        ],
    },
    Make {
        value: "mitsubishi",
        label: "Mitsubishi",
        models: &[
            entry("triton", "Triton"),
            entry("outlander", "Outlander"),
            entry("pajero", "Pajero"),
        ],
    },
    Make {
        value: "subaru",
        label: "Subaru",
        models: &[
            entry("forester", "Forester"),
            entry("outback", "Outback"),
            entry("wrx", "WRX"),
        ],
    },
    Make {
        value: "volkswagen",
        label: "Volkswagen",
        models: &[
            entry("golf", "Golf"),
            entry("tiguan", "Tiguan"),
            entry("amarok", "Amarok"),
        ],
    },
    Make {
        value: "bmw",
        label: "BMW",
        models: &[
            entry("3series", "3 Series"),
            entry("x3", "X3"),
            entry("x5", "X5"),
        ],
    },
    Make {
        value: "mercedes",
        label: "Mercedes-Benz",
        models: &[
            entry("cclass", "C-Class"),
            entry("glc", "GLC"),
            entry("gle", "GLE"),
        ],
    },
    Make {
        value: "audi",
        label: "Audi",
        models: &[entry("a4", "A4"), entry("q5", "Q5"), entry("q7", "Q7")],
    },
];

pub const LOCATIONS: [Location; 12] = [
    location("sydney", "Sydney, NSW", "sydney-nsw"),
    location("melbourne", "Melbourne, VIC", "melbourne-vic"),
    location("brisbane", "Brisbane, QLD", "brisbane-qld"),
    location("perth", "Perth, WA", "perth-wa"),
    location("adelaide", "Adelaide, SA", "adelaide-sa"),
    location("hobart", "Hobart, TAS", "hobart-tas"),
    location("darwin", "Darwin, NT", "darwin-nt"),
    location("canberra", "Canberra, ACT", "canberra-act"),
    location("goldcoast", "Gold Coast, QLD", "goldcoast-qld"),
    location("newcastle", "Newcastle, NSW", "newcastle-nsw"),
    location("cairns", "Cairns, QLD", "cairns-qld"),
    location("townsville", "Townsville, QLD", "townsville-qld"),
];

pub fn makes() -> &'static [Make] {
    &MAKES
}

pub fn find_make(value: &str) -> Option<&'static Make> {
    MAKES.iter().find(|make| make.value == value)
}

/// Models for `make` in display order; empty for an unknown make.
pub fn models_for(make: &str) -> &'static [Entry] {
    find_make(make).map(|make| make.models).unwrap_or(&[])
}

pub fn find_model(make: &str, model: &str) -> Option<&'static Entry> {
    models_for(make).iter().find(|entry| entry.value == model)
}

pub fn make_label(make: &str) -> Option<&'static str> {
    find_make(make).map(|make| make.label)
}

pub fn model_label(make: &str, model: &str) -> Option<&'static str> {
    find_model(make, model).map(|entry| entry.label)
}

/// Locations whose label or value contains `query`, ignoring case. An empty
/// query suggests nothing.
pub fn search_locations(query: &str) -> Vec<&'static Location> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    LOCATIONS
        .iter()
        .filter(|loc| {
            loc.label.to_lowercase().contains(&needle) || loc.value.to_lowercase().contains(&needle)
        })
        .collect()
}

pub fn find_location_by_ref(reference: &str) -> Option<&'static Location> {
    LOCATIONS.iter().find(|loc| loc.reference == reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn models_follow_their_make() {
        let toyota: Vec<_> = models_for("toyota").iter().map(|m| m.value).collect();
        assert_eq!(toyota, ["camry", "corolla", "hilux", "rav4", "landcruiser"]);
        assert!(models_for("delorean").is_empty());
        assert_eq!(model_label("mazda", "cx5"), Some("CX-5"));
        assert_eq!(model_label("ford", "camry"), None);
    }

    #[test]
    fn location_search_is_case_insensitive() {
        let hits: Vec<_> = search_locations("QLD").iter().map(|l| l.value).collect();
        assert_eq!(hits, ["brisbane", "goldcoast", "cairns", "townsville"]);

        let by_value: Vec<_> = search_locations("goldc").iter().map(|l| l.reference).collect();
        assert_eq!(by_value, ["goldcoast-qld"]);
    }

    #[test]
    fn empty_search_suggests_nothing() {
        assert!(search_locations("").is_empty());
        assert!(search_locations("   ").is_empty());
        assert!(search_locations("auckland").is_empty());
    }

    #[test]
    fn location_serializes_ref_field() {
        let json = serde_json::to_value(find_location_by_ref("perth-wa").unwrap()).unwrap();
        assert_eq!(json["ref"], "perth-wa");
        assert_eq!(json["label"], "Perth, WA");
    }
}
