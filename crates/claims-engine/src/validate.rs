/// Field-level validators for procedure (CPT), diagnosis (ICD-10) and
/// provider (NPI) codes.
///
/// These are format checks only; no code is looked up in any registry.
/// Every check is total: empty or garbled input is reported as invalid, never
/// as an error.
use regex::Regex;

use crate::error::EngineError;

/// Length limits applied by the validators. Lengths count characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub cpt_min_len: usize,
    pub cpt_max_len: usize,
    pub npi_len: usize,
    pub icd10_min_len: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpt_min_len: 4,
            cpt_max_len: 6,
            npi_len: 10,
            icd10_min_len: 3,
        }
    }
}

impl Thresholds {
    fn check(&self) -> Result<(), EngineError> {
        if self.cpt_min_len == 0 || self.npi_len == 0 || self.icd10_min_len == 0 {
            return Err(EngineError::Thresholds(
                "lengths must be greater than zero".to_string(),
            ));
        }
        if self.cpt_min_len > self.cpt_max_len {
            return Err(EngineError::Thresholds(format!(
                "cpt_min_len ({}) exceeds cpt_max_len ({})",
                self.cpt_min_len, self.cpt_max_len
            )));
        }
        Ok(())
    }
}

/// Validators compiled from a fixed set of thresholds.
///
/// Built once and shared read-only; holds no per-call state.
#[derive(Debug, Clone)]
pub struct Validators {
    thresholds: Thresholds,
    npi_re: Regex,
}

impl Validators {
    pub fn new(thresholds: Thresholds) -> Result<Self, EngineError> {
        thresholds.check()?;
        let npi_re = Regex::new(&format!("^[0-9]{{{}}}$", thresholds.npi_len))?;
        Ok(Self { thresholds, npi_re })
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Hyphens are ignored when checking for digits, but the length limits
    /// apply to the code as written, hyphens included.
    pub fn is_valid_cpt(&self, code: &str) -> bool {
        let len = code.chars().count();
        if len < self.thresholds.cpt_min_len || len > self.thresholds.cpt_max_len {
            return false;
        }
        let mut digits = code.chars().filter(|&c| c != '-').peekable();
        digits.peek().is_some() && digits.all(|c| c.is_ascii_digit())
    }

    /// A letter, then letters/digits with any periods dropped.
    pub fn is_valid_icd10(&self, code: &str) -> bool {
        let code = code.to_uppercase();
        if code.chars().count() < self.thresholds.icd10_min_len {
            return false;
        }
        let mut chars = code.chars();
        match chars.next() {
            Some(first) if first.is_alphabetic() => {}
            _ => return false,
        }
        let mut rest = chars.filter(|&c| c != '.').peekable();
        rest.peek().is_some() && rest.all(char::is_alphanumeric)
    }

    pub fn is_valid_npi(&self, npi: &str) -> bool {
        self.npi_re.is_match(npi)
    }
}

impl Default for Validators {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            npi_re: Regex::new("^[0-9]{10}$").expect("valid regex"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpt_codes() {
        let v = Validators::default();
        assert!(v.is_valid_cpt("99213"));
        assert!(v.is_valid_cpt("0001"));
        assert!(v.is_valid_cpt("99-13"));
        assert!(!v.is_valid_cpt("1234567"), "too long");
        assert!(!v.is_valid_cpt("123"), "too short");
        assert!(!v.is_valid_cpt("ABCDE"));
        assert!(!v.is_valid_cpt("9921A"));
        assert!(!v.is_valid_cpt("----"), "nothing left after stripping hyphens");
        assert!(!v.is_valid_cpt(""));
    }

    #[test]
    fn cpt_length_counts_hyphens() {
        let v = Validators::default();
        // six digits plus a hyphen is seven characters as written
        assert!(!v.is_valid_cpt("992-134"));
        assert!(v.is_valid_cpt("9-213"));
    }

    #[test]
    fn icd10_codes() {
        let v = Validators::default();
        assert!(v.is_valid_icd10("E11.9"));
        assert!(v.is_valid_icd10("e11.9"), "case is normalized");
        assert!(v.is_valid_icd10("Z00"));
        assert!(!v.is_valid_icd10("11.9"), "must start with a letter");
        assert!(!v.is_valid_icd10("E1"), "too short");
        assert!(!v.is_valid_icd10("E.."), "nothing after the letter but periods");
        assert!(!v.is_valid_icd10("E11-9"));
        assert!(!v.is_valid_icd10(""));
    }

    #[test]
    fn npi_identifiers() {
        let v = Validators::default();
        assert!(v.is_valid_npi("1234567890"));
        assert!(!v.is_valid_npi("12345"));
        assert!(!v.is_valid_npi("123456789A"));
        assert!(!v.is_valid_npi("12345678901"));
        assert!(!v.is_valid_npi("1234567890\n"));
        assert!(!v.is_valid_npi(""));
    }

    #[test]
    fn non_ascii_digits_are_rejected() {
        let v = Validators::default();
        // Arabic-Indic digits
        assert!(!v.is_valid_cpt("\u{669}\u{669}\u{662}\u{661}\u{663}"));
        assert!(!v.is_valid_npi("\u{661}\u{662}\u{663}\u{664}\u{665}\u{666}\u{667}\u{668}\u{669}\u{660}"));
        // fullwidth digits
        assert!(!v.is_valid_cpt("\u{ff19}\u{ff19}\u{ff12}\u{ff11}\u{ff13}"));
    }

    #[test]
    fn custom_thresholds() {
        let v = Validators::new(Thresholds {
            cpt_min_len: 5,
            cpt_max_len: 5,
            npi_len: 8,
            icd10_min_len: 4,
        })
        .unwrap();
        assert!(!v.is_valid_cpt("0001"));
        assert!(v.is_valid_cpt("99213"));
        assert!(v.is_valid_npi("12345678"));
        assert!(!v.is_valid_npi("1234567890"));
        assert!(!v.is_valid_icd10("Z00"));
    }

    #[test]
    fn rejects_inverted_cpt_range() {
        let err = Validators::new(Thresholds {
            cpt_min_len: 7,
            cpt_max_len: 6,
            ..Thresholds::default()
        })
        .unwrap_err();
        assert!(matches!(err, EngineError::Thresholds(_)));
    }

    #[test]
    fn default_matches_default_thresholds() {
        let built = Validators::new(Thresholds::default()).unwrap();
        let default = Validators::default();
        assert_eq!(built.thresholds(), default.thresholds());
        assert_eq!(built.npi_re.as_str(), default.npi_re.as_str());
    }
}
