//! AIS ship type classification.
//!
//! Type codes 0..=99 are grouped into ranges that share a category. Codes
//! outside the table (100+, or a missing type) resolve to `None`.

use serde::Serialize;

/// Classification of one AIS ship type code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ShipType {
    pub code: i32,
    /// Category used for grouping and rendering (e.g. "cargo", "tug")
    pub short_name: &'static str,
    pub name: &'static str,
    pub summary: &'static str,
}

type Range = (i32, i32, &'static str, &'static str, &'static str);

const RANGES: &[Range] = &[
    (0, 19, "unspecified", "unspecified", "reserved"),
    (20, 28, "wing", "wing in ground", "wing in grnd"),
    (29, 29, "sar", "search and rescue", "SAR aircraft"),
    (30, 30, "fishing", "fishing", "fishing"),
    (31, 32, "tug", "tug", "tug"),
    (33, 33, "special", "special craft", "dredger"),
    (34, 34, "special", "special craft", "dive vessel"),
    (35, 35, "special", "special craft", "military ops"),
    (36, 36, "sailing", "sailing vessel", "sailing vessel"),
    (37, 37, "pleasure", "pleasure craft", "pleasure craft"),
    (38, 39, "unspecified", "unspecified", "reserved"),
    (40, 49, "highspeed", "high-speed craft", "high-speed craft"),
    (50, 50, "special", "special craft", "pilot vessel"),
    (51, 51, "sar", "search and rescue", "SAR"),
    (52, 52, "tug", "tug", "tug"),
    (53, 53, "special", "special craft", "port tender"),
    (54, 54, "special", "special craft", "anti-pollution"),
    (55, 55, "special", "special craft", "law enforce"),
    (56, 57, "special", "special craft", "local vessel"),
    (58, 58, "special", "special craft", "medical trans"),
    (59, 59, "special", "special craft", "special craft"),
    (60, 69, "passenger", "passenger", "passenger"),
    (70, 70, "cargo", "cargo", "cargo"),
    (71, 71, "cargo", "cargo", "cargo - hazard A (major)"),
    (72, 72, "cargo", "cargo", "cargo - hazard B"),
    (73, 73, "cargo", "cargo", "cargo - hazard C (minor)"),
    (74, 74, "cargo", "cargo", "cargo - hazard D (recognizable)"),
    (75, 79, "cargo", "cargo", "cargo"),
    (80, 80, "tanker", "tanker", "tanker"),
    (81, 81, "tanker", "tanker", "tanker - hazard A (major)"),
    (82, 82, "tanker", "tanker", "tanker - hazard B"),
    (83, 83, "tanker", "tanker", "tanker - hazard C (minor)"),
    (84, 84, "tanker", "tanker", "tanker - hazard D (recognizable)"),
    (85, 89, "tanker", "tanker", "tanker"),
    (90, 99, "other", "other", "other"),
];

/// Looks up the classification of an AIS type code.
pub fn lookup(code: i32) -> Option<ShipType> {
    RANGES
        .iter()
        .find(|(first, last, ..)| (*first..=*last).contains(&code))
        .map(|&(_, _, short_name, name, summary)| ShipType {
            code,
            short_name,
            name,
            summary,
        })
}

/// Every classified code, in ascending order.
pub fn all() -> impl Iterator<Item = ShipType> {
    (0..=99).filter_map(lookup)
}
