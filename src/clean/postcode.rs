use super::CleaningRules;
use std::collections::BTreeMap;

/// Replaces known malformed postcodes by exact match
///
/// This is not a validator: values missing from the table are returned as
/// they are, whatever their length.
#[derive(Debug, Clone, Default)]
pub struct PostcodeCleaner {
    corrections: BTreeMap<String, String>,
}

impl PostcodeCleaner {
    pub fn new(rules: &CleaningRules) -> Self {
        PostcodeCleaner {
            corrections: rules.postcode_corrections.clone(),
        }
    }

    pub fn clean(&self, postcode: &str) -> String {
        self.corrections
            .get(postcode)
            .cloned()
            .unwrap_or_else(|| postcode.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaner() -> PostcodeCleaner {
        PostcodeCleaner::new(&CleaningRules::default())
    }

    #[test]
    fn test_known_values_are_corrected() {
        let cleaner = cleaner();
        assert_eq!(cleaner.clean("462000"), "46200");
        assert_eq!(cleaner.clean("5400"), "54000");
        assert_eq!(cleaner.clean("56000 "), "56000");
        assert_eq!(cleaner.clean("6800"), "68000");
    }

    #[test]
    fn test_unknown_values_pass_through() {
        let cleaner = cleaner();
        assert_eq!(cleaner.clean("50000"), "50000");
        assert_eq!(cleaner.clean("123"), "123");
        assert_eq!(cleaner.clean(" 5400"), " 5400");
    }

    #[test]
    fn test_empty_table_is_identity() {
        assert_eq!(PostcodeCleaner::default().clean("462000"), "462000");
    }
}
