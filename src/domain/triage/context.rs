//! Prompt and context assembly for the generation backend.
//!
//! The payload is: a system prompt (persona rules plus stage guidance), then
//! a bounded window of the most recent history, then the current user
//! message. Truncation drops the oldest messages first and never reorders
//! what remains.

use serde::{Deserialize, Serialize};

use super::message::{Role, Transcript};
use super::stage::Stage;
use super::state::ConversationState;

/// Default number of history messages kept in the context window.
pub const DEFAULT_HISTORY_WINDOW: usize = 30;

/// Persona and ground rules sent with every request.
pub const PERSONA_PROMPT: &str = r#"당신은 친근하고 전문적인 의사입니다. 환자와 자연스럽게 대화하면서 증상을 체계적으로 파악하고 있습니다.

🎯 핵심 규칙:
1. 대화 히스토리를 꼼꼼히 분석하여 이미 답변받은 정보는 절대 다시 질문하지 마세요
2. 한 번에 하나의 질문만 하세요
3. 환자의 이전 답변을 바탕으로 다음 질문을 결정하세요
4. 중복되지 않는 새로운 정보만 요청하세요

📋 대화 분석 방법:
- 이전 대화에서 환자가 이미 말한 증상, 시기, 특징 등을 정확히 파악
- 아직 답변받지 못한 정보만 질문
- 환자의 답변 패턴을 분석하여 관련된 추가 정보 요청

🔍 정보 수집 우선순위:
1. 주요 증상 (어디가 아픈지) - 이미 답변받았다면 다음으로
2. 발생 시기 (언제부터) - 이미 답변받았다면 다음으로
3. 증상 특징 (어떤 상황에서 심해지는지) - 이미 답변받았다면 다음으로
4. 통증 강도나 추가 증상 - 이미 답변받았다면 다음으로
5. 원인이나 유발 요인 - 이미 답변받았다면 다음으로

✅ 대화 히스토리 활용 예시:
환자: "두통이 있어"
AI: "두통이 언제부터 시작되셨나요?"
환자: "어제부터"
AI: "어제부터 두통이 지속되고 있군요. 두통이 특히 어떤 상황에서 심해지나요?" (시기는 이미 알았으므로 다음 정보 요청)

❌ 잘못된 예시:
환자: "두통이 있어"
AI: "두통이 언제부터 시작되셨나요?"
환자: "어제부터"
AI: "두통이 언제부터 시작되셨나요?" (중복 질문 - 절대 금지)

📊 대화 상태 추적:
- 현재까지 수집된 정보를 정리하여 다음 질문 결정
- 충분한 정보가 수집되면 자동으로 요약 제공
- 응급 상황 감지 시 즉시 대응

💡 지능적 응답 방식:
1. 이전 대화 분석 → 이미 답변받은 정보 파악
2. 누락된 정보 식별 → 새로운 질문 결정
3. 관련성 있는 추가 정보 요청
4. 충분한 정보 수집 시 요약 제공

⚠️ 주의사항:
- 절대 중복 질문하지 마세요
- 이미 답변받은 내용은 활용하되 다시 질문하지 마세요
- 구체적인 진단이나 약물 처방은 하지 마세요
- 응급 상황 시 즉시 119 연락 권고
- 의료진 상담의 중요성 강조

답변 형식:
- 간단하고 명확한 하나의 질문만
- 이전 대화 내용을 참고한 자연스러운 다음 질문
- 필요시 간단한 설명이나 안내

자동 요약 시 (충분한 정보 수집 후):
다음 형식으로 간결하게 요약해주세요:

📋 **현재 상황 요약**
- 주요 증상: [증상 요약]
- 발생 시기: [언제부터]
- 증상 특징: [어떤 상황에서 심해지는지]

🔍 **가능한 원인**
- [가능한 원인 1-2개]

⚠️ **주의사항**
- [즉시 병원 방문이 필요한 경우]
- [일반적인 주의사항]

💡 **권고사항**
- [즉시 조치사항]
- [병원 방문 권고]

항상 "정확한 진단과 치료를 위해서는 반드시 의료진과 상담하시기 바랍니다"로 마무리하세요."#;

/// Role of a message in the assembled context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextRole {
    System,
    User,
    Assistant,
}

impl From<Role> for ContextRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => Self::User,
            Role::Assistant => Self::Assistant,
        }
    }
}

/// A message in the assembled context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMessage {
    pub role: ContextRole,
    pub content: String,
}

impl ContextMessage {
    pub fn new(role: ContextRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Payload for a single generation call. Discarded after the call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Persona rules followed by stage guidance.
    pub system_prompt: String,
    /// Windowed history followed by the current user message.
    pub messages: Vec<ContextMessage>,
    /// Output-length cap for the primary call.
    pub max_tokens: u32,
    pub stage: Stage,
}

/// Stage-specific instruction appended to the persona prompt.
pub fn stage_guidance(state: &ConversationState) -> String {
    match state.stage {
        Stage::Initial => "현재 첫 번째 상담입니다. 환자의 증상을 자연스럽게 파악하고 구체적인 질문을 하세요. \
             반드시 한 번에 하나의 질문만 하세요."
            .to_string(),
        Stage::SymptomCollection => {
            let missing = state
                .missing
                .iter()
                .map(|category| category.label())
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "증상 수집 단계입니다. 현재까지 수집된 정보: {}. 누락된 정보: {}. \
                 이전 대화에서 이미 답변받은 내용은 다시 질문하지 마세요. 반드시 한 번에 하나의 질문만 하세요.",
                collected_json(state),
                missing
            )
        }
        Stage::DetailedAnalysis => format!(
            "상세 분석 단계입니다. 현재까지 수집된 정보: {}. \
             이전 대화 내용을 참고하여 중복되지 않는 새로운 정보만 요청하세요. 반드시 한 번에 하나의 질문만 하세요.",
            collected_json(state)
        ),
        Stage::Summary => "최종 요약 단계입니다. 수집된 모든 정보를 종합하여 현재 상태, 가능한 원인, \
             권고사항을 정리하세요."
            .to_string(),
    }
}

fn collected_json(state: &ConversationState) -> String {
    // InfoRecord serializes to a flat map of strings and nulls
    serde_json::to_string(&state.collected).unwrap_or_else(|_| "{}".to_string())
}

/// Builds generation payloads with a bounded history window.
#[derive(Debug, Clone, Copy)]
pub struct ContextAssembler {
    history_window: usize,
}

impl ContextAssembler {
    pub fn new(history_window: usize) -> Self {
        Self { history_window }
    }

    pub fn history_window(&self) -> usize {
        self.history_window
    }

    /// Assembles the payload for the current turn.
    pub fn assemble(
        &self,
        state: &ConversationState,
        history: &Transcript,
        current: &str,
    ) -> GenerationRequest {
        let system_prompt = format!("{}\n\n{}", PERSONA_PROMPT, stage_guidance(state));

        let mut messages: Vec<ContextMessage> = history
            .recent(self.history_window)
            .iter()
            .map(|m| ContextMessage::new(m.role().into(), m.text()))
            .collect();
        messages.push(ContextMessage::new(ContextRole::User, current));

        GenerationRequest {
            system_prompt,
            messages,
            max_tokens: state.stage.max_output_tokens(),
            stage: state.stage,
        }
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW)
    }
}
