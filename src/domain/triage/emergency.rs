//! Emergency language detection.
//!
//! Only the current message is inspected. A hit bypasses analysis and
//! generation entirely and the caller answers with [`EMERGENCY_DIRECTIVE`].

/// High-risk terms. Matching is a case-insensitive substring test.
pub const EMERGENCY_KEYWORDS: [&str; 15] = [
    "심한 통증",
    "의식 상실",
    "호흡 곤란",
    "출혈",
    "가슴 통증",
    "마비",
    "발작",
    "중독",
    "응급",
    "119",
    "심장마비",
    "뇌졸중",
    "복통",
    "고열",
    "경련",
];

/// Fixed reply sent when emergency language is detected.
pub const EMERGENCY_DIRECTIVE: &str = "⚠️ 응급 상황이 감지되었습니다!

즉시 119에 연락하거나 가까운 응급실을 방문하세요.

이것은 AI 상담의 한계이며, 전문 의료진의 즉시 진료가 필요합니다.

정확한 진단과 치료를 위해서는 반드시 의료진과 상담하시기 바랍니다.";

/// Returns true if `message` contains any emergency keyword.
///
/// Total over all input; an empty message never matches.
pub fn is_emergency(message: &str) -> bool {
    if message.is_empty() {
        return false;
    }
    let lowered = message.to_lowercase();
    EMERGENCY_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(&keyword.to_lowercase()))
}
