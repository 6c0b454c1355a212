//! Local reply synthesis used when every remote generation attempt failed.
//!
//! Pure and total: no I/O, never panics, never returns an empty string.

use super::extractor::InfoCategory;
use super::stage::Stage;
use super::state::ConversationState;

/// Follow-up used when nothing is missing.
pub const GENERIC_FOLLOW_UP: &str = "그렇군요. 다른 증상은 없으신가요?";

/// Canned clarifying question for a missing category.
pub fn clarifying_question(category: InfoCategory) -> &'static str {
    match category {
        InfoCategory::MainSymptom => "어떤 증상으로 오셨나요? 좀 더 구체적으로 말씀해주세요.",
        InfoCategory::Timing => "언제부터 이런 증상이 있으셨나요?",
        InfoCategory::Severity => "증상이 얼마나 심한가요?",
        InfoCategory::Trigger => "특별한 이유나 계기가 있으셨나요?",
        InfoCategory::AdditionalSymptoms => "다른 증상도 함께 있으신가요?",
    }
}

/// Deterministic stand-in for the generation backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalResponseSynthesizer;

impl LocalResponseSynthesizer {
    /// Produces a reply from the analyzed state alone.
    ///
    /// `_message` is accepted so the synthesizer can stand in for a backend
    /// call; the reply depends only on `state`.
    pub fn reply(&self, _message: &str, state: &ConversationState) -> String {
        if state.stage == Stage::Summary {
            return summary(state);
        }

        match state.next_missing() {
            Some(category) => clarifying_question(category).to_string(),
            None => GENERIC_FOLLOW_UP.to_string(),
        }
    }
}

fn summary(state: &ConversationState) -> String {
    let info = &state.collected;
    format!(
        "📋 **현재 상황 요약**
- 주요 증상: {}
- 발생 시기: {}
- 증상 특징: {}

🔍 **가능한 원인**
- 다양한 원인 가능성

⚠️ **주의사항**
- 심한 증상 시 즉시 병원 방문

💡 **권고사항**
- 정확한 진단을 위해 병원 방문 권고

정확한 진단과 치료를 위해서는 반드시 의료진과 상담하시기 바랍니다.",
        info.get(InfoCategory::MainSymptom).unwrap_or("통증"),
        info.get(InfoCategory::Timing).unwrap_or("최근"),
        info.get(InfoCategory::Severity).unwrap_or("지속적"),
    )
}
