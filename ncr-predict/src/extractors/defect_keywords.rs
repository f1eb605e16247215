//! Keyword-family defect typing
//!
//! Each family scores one point per keyword found (case-insensitive
//! substring). The highest score wins, ties go to the family listed first,
//! and no hits at all yields `unknown`.

use ncr_common::Category;

/// Keyword families in priority order
pub const DEFECT_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "dimensional",
        &[
            "dimensional",
            "diameter",
            "tolerance",
            "mm",
            "out of tolerance",
            "measured",
            "gauge",
            "no-go",
        ],
    ),
    ("surface", &["surface", "scratch", "dent", "pit", "bulge", "offset"]),
    (
        "marking",
        &["marking", "faint", "unrecognizable", "character", "dot", "label"],
    ),
    ("appearance", &["appearance", "collapse", "tooth", "rib", "slot"]),
    (
        "process",
        &[
            "deviation",
            "calibration",
            "compensation",
            "clamping",
            "centering",
            "not stable",
        ],
    ),
    (
        "measurement",
        &["re-measurement", "after re-measurement", "fctd", "mini program"],
    ),
];

/// Heuristic defect family of `text`
pub fn keyword_defect_type(text: &str) -> Category {
    let lowered = text.to_lowercase();

    let mut best: Option<(&str, usize)> = None;
    for (family, keywords) in DEFECT_KEYWORDS {
        let score = keywords.iter().filter(|kw| lowered.contains(*kw)).count();
        if score > 0 && best.map_or(true, |(_, top)| score > top) {
            best = Some((*family, score));
        }
    }

    best.map(|(family, _)| Category::new(family))
        .unwrap_or_else(Category::unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensional() {
        assert_eq!(
            keyword_defect_type("Diameter measured out of tolerance").as_str(),
            "dimensional"
        );
    }

    #[test]
    fn test_marking() {
        assert_eq!(keyword_defect_type("Faint marking, unrecognizable").as_str(), "marking");
    }

    #[test]
    fn test_no_hits_is_unknown() {
        assert!(keyword_defect_type("awaiting QA confirmation").is_unknown());
        assert!(keyword_defect_type("").is_unknown());
    }

    #[test]
    fn test_tie_goes_to_first_family() {
        // one surface hit ("scratch"), one appearance hit ("slot")
        assert_eq!(keyword_defect_type("scratch in slot").as_str(), "surface");
    }

    #[test]
    fn test_measurement_keywords_case_insensitive() {
        assert_eq!(
            keyword_defect_type("FCTD after re-measurement with mini program").as_str(),
            "measurement"
        );
    }
}
