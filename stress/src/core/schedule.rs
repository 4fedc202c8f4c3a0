//! Case numbering for a run.
//!
//! A run of `total` cases executes cases `0..total`. Case 0 is an untimed
//! sanity check; every later case is timed. Fresh input is generated once
//! before case 0 and after each passing case except the last.

/// Position of a case within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseKind {
    Sanity,
    Timed,
}

pub fn case_kind(case: u32) -> CaseKind {
    if case == 0 {
        CaseKind::Sanity
    } else {
        CaseKind::Timed
    }
}

/// Progress label printed before a case runs.
pub fn case_label(case: u32) -> String {
    match case_kind(case) {
        CaseKind::Sanity => "Sanity check".to_string(),
        CaseKind::Timed => format!("Test {case}"),
    }
}

/// Whether new input must be generated after `case` passes.
pub fn regenerate_after(case: u32, total: u32) -> bool {
    case.saturating_add(1) < total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_zero_is_the_untimed_sanity_case() {
        assert_eq!(case_kind(0), CaseKind::Sanity);
        assert_eq!(case_kind(1), CaseKind::Timed);
        assert_eq!(case_label(0), "Sanity check");
        assert_eq!(case_label(7), "Test 7");
    }

    #[test]
    fn no_regeneration_after_final_case() {
        assert!(regenerate_after(0, 100));
        assert!(regenerate_after(98, 100));
        assert!(!regenerate_after(99, 100));
        assert!(!regenerate_after(0, 1));
    }

    #[test]
    fn generator_runs_once_per_case() {
        let total = 100u32;
        let after_cases = (0..total).filter(|&c| regenerate_after(c, total)).count();
        assert_eq!(1 + after_cases, total as usize);
    }
}
