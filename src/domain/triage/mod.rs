//! Conversational triage domain.
//!
//! Pure decision logic for the intake assistant: emergency detection,
//! lexical information extraction, stage classification, context assembly
//! and the local fallback reply. No I/O happens in this module.

mod context;
mod emergency;
mod extractor;
mod fallback;
mod message;
mod reply;
mod stage;
mod state;

pub use context::{
    stage_guidance, ContextAssembler, ContextMessage, ContextRole, GenerationRequest,
    DEFAULT_HISTORY_WINDOW, PERSONA_PROMPT,
};
pub use emergency::{is_emergency, EMERGENCY_DIRECTIVE, EMERGENCY_KEYWORDS};
pub use extractor::{InfoCategory, InfoExtractor, InfoRecord, KeywordExtractor};
pub use fallback::{clarifying_question, LocalResponseSynthesizer, GENERIC_FOLLOW_UP};
pub use message::{Message, Role, Transcript};
pub use reply::{ReplySource, TriageReply};
pub use stage::{CompletenessPolicy, Stage, StagePolicy, TurnCountPolicy};
pub use state::{ConversationAnalyzer, ConversationState};
