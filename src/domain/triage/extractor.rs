//! Rule-based extraction of clinical signals from user text.
//!
//! Each category owns a small Korean vocabulary. Extraction returns the first
//! vocabulary entry (in listed order) that occurs as a substring of the
//! lower-cased user text. This is a lexical heuristic, nothing more: a token
//! being present says only that the word appeared.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// The five signal slots the intake protocol tracks, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InfoCategory {
    MainSymptom,
    Timing,
    Severity,
    Trigger,
    AdditionalSymptoms,
}

impl InfoCategory {
    /// All categories in question priority order.
    pub const ALL: [InfoCategory; 5] = [
        InfoCategory::MainSymptom,
        InfoCategory::Timing,
        InfoCategory::Severity,
        InfoCategory::Trigger,
        InfoCategory::AdditionalSymptoms,
    ];

    /// Field name used when the record is rendered as JSON.
    pub fn key(&self) -> &'static str {
        match self {
            Self::MainSymptom => "mainSymptom",
            Self::Timing => "timing",
            Self::Severity => "severity",
            Self::Trigger => "trigger",
            Self::AdditionalSymptoms => "additionalSymptoms",
        }
    }

    /// Korean label shown to the model when the category is still missing.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MainSymptom => "주요 증상",
            Self::Timing => "발생 시기",
            Self::Severity => "증상 강도",
            Self::Trigger => "유발 요인",
            Self::AdditionalSymptoms => "추가 증상",
        }
    }

    /// Vocabulary scanned for this category. Earlier entries win ties.
    pub fn vocabulary(&self) -> &'static [&'static str] {
        match self {
            Self::MainSymptom => &[
                "머리", "두통", "배", "복통", "기침", "목", "팔", "다리", "가슴", "등", "발목",
                "무릎", "어깨", "허리", "손", "발",
            ],
            Self::Timing => &["어제", "오늘", "일주일", "한달", "며칠", "몇일", "언제"],
            Self::Severity => &["많이", "심하게", "조금", "가벼운", "강한", "약한", "지속", "간헐"],
            Self::Trigger => &[
                "운동", "다치", "부딪", "넘어", "걸", "달리", "걷", "앉", "서", "누워", "만지",
                "누르",
            ],
            Self::AdditionalSymptoms => &[
                "붓", "부어", "빨갛", "따뜻", "차갑", "저림", "마비", "어지러", "메스꺼", "열",
                "오한",
            ],
        }
    }
}

/// Strategy for pulling a token for one category out of accumulated text.
///
/// The keyword implementation is the default; a statistical classifier can be
/// dropped in behind the same contract.
pub trait InfoExtractor: Send + Sync {
    /// Returns the matched token for `category`, or `None` if nothing matched.
    ///
    /// Must be deterministic for identical input.
    fn extract(&self, category: InfoCategory, text: &str) -> Option<String>;
}

/// Fixed-vocabulary substring matcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordExtractor;

impl InfoExtractor for KeywordExtractor {
    fn extract(&self, category: InfoCategory, text: &str) -> Option<String> {
        let lowered = text.to_lowercase();
        category
            .vocabulary()
            .iter()
            .find(|token| lowered.contains(*token))
            .map(|token| (*token).to_string())
    }
}

/// What has been learned so far, one optional token per category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoRecord {
    slots: [Option<String>; 5],
}

impl InfoRecord {
    /// Runs `extractor` over `text` for every category.
    pub fn extract_from(extractor: &dyn InfoExtractor, text: &str) -> Self {
        let mut record = Self::default();
        for category in InfoCategory::ALL {
            record.slots[category as usize] = extractor.extract(category, text);
        }
        record
    }

    pub fn get(&self, category: InfoCategory) -> Option<&str> {
        self.slots[category as usize].as_deref()
    }

    /// Builder used by tests and alternative extractors.
    pub fn with(mut self, category: InfoCategory, token: impl Into<String>) -> Self {
        self.slots[category as usize] = Some(token.into());
        self
    }

    /// Number of categories with a token.
    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Categories without a token, in priority order.
    pub fn missing(&self) -> Vec<InfoCategory> {
        InfoCategory::ALL
            .into_iter()
            .filter(|category| self.get(*category).is_none())
            .collect()
    }
}

impl Serialize for InfoRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(InfoCategory::ALL.len()))?;
        for category in InfoCategory::ALL {
            map.serialize_entry(category.key(), &self.get(category))?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn extract(category: InfoCategory, text: &str) -> Option<String> {
        KeywordExtractor.extract(category, text)
    }

    mod keyword_extractor {
        use super::*;

        #[test]
        fn finds_main_symptom() {
            assert_eq!(extract(InfoCategory::MainSymptom, "두통이 있어"), Some("두통".to_string()));
        }

        #[test]
        fn earlier_vocabulary_entry_wins() {
            // "머리" is listed before "두통"
            assert_eq!(
                extract(InfoCategory::MainSymptom, "두통이 있고 머리가 무거워요"),
                Some("머리".to_string())
            );
        }

        #[test]
        fn finds_timing_and_severity() {
            let text = "어제부터 많이 아파요";
            assert_eq!(extract(InfoCategory::Timing, text), Some("어제".to_string()));
            assert_eq!(extract(InfoCategory::Severity, text), Some("많이".to_string()));
        }

        #[test]
        fn matches_inside_inflected_words() {
            assert_eq!(extract(InfoCategory::Trigger, "운동하다가 넘어졌어요"), Some("운동".to_string()));
            assert_eq!(
                extract(InfoCategory::AdditionalSymptoms, "발목이 부어 있어요"),
                Some("부어".to_string())
            );
        }

        #[test]
        fn absence_is_none() {
            assert_eq!(extract(InfoCategory::Timing, "그냥 그래요"), None);
            assert_eq!(extract(InfoCategory::MainSymptom, ""), None);
        }
    }

    mod info_record {
        use super::*;

        #[test]
        fn empty_text_misses_everything() {
            let record = InfoRecord::extract_from(&KeywordExtractor, "");
            assert_eq!(record.filled_count(), 0);
            assert_eq!(record.missing(), InfoCategory::ALL.to_vec());
        }

        #[test]
        fn missing_keeps_priority_order() {
            let record = InfoRecord::default()
                .with(InfoCategory::MainSymptom, "두통")
                .with(InfoCategory::Severity, "많이");
            assert_eq!(
                record.missing(),
                vec![
                    InfoCategory::Timing,
                    InfoCategory::Trigger,
                    InfoCategory::AdditionalSymptoms
                ]
            );
            assert_eq!(record.filled_count(), 2);
        }

        #[test]
        fn serializes_with_camel_case_keys_and_nulls() {
            let record = InfoRecord::default().with(InfoCategory::MainSymptom, "두통");
            let json = serde_json::to_value(&record).unwrap();
            assert_eq!(json["mainSymptom"], "두통");
            assert!(json["timing"].is_null());
            assert!(json["additionalSymptoms"].is_null());
        }

        #[test]
        fn matches_accumulate_as_text_grows() {
            let first = InfoRecord::extract_from(&KeywordExtractor, "두통이 있어");
            let later = InfoRecord::extract_from(&KeywordExtractor, "두통이 있어 어제부터");
            for category in InfoCategory::ALL {
                if first.get(category).is_some() {
                    assert!(later.get(category).is_some());
                }
            }
            assert!(later.get(InfoCategory::Timing).is_some());
        }
    }

    proptest! {
        #[test]
        fn extraction_is_idempotent(text in "\\PC{0,60}") {
            let first = InfoRecord::extract_from(&KeywordExtractor, &text);
            let second = InfoRecord::extract_from(&KeywordExtractor, &text);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn appended_text_never_unmatches(base in "\\PC{0,40}", extra in "\\PC{0,40}") {
            let before = InfoRecord::extract_from(&KeywordExtractor, &base);
            let after = InfoRecord::extract_from(&KeywordExtractor, &format!("{base} {extra}"));
            for category in InfoCategory::ALL {
                if before.get(category).is_some() {
                    prop_assert!(after.get(category).is_some());
                }
            }
        }
    }
}
