//! Chat transcript and request-context construction.
//!
//! The transcript is append-only; only an explicit clear empties it.
//! The context window sent to the completion service is rebuilt from
//! scratch for every question and never cached.

use serde::{Deserialize, Serialize};

use crate::error::DeskError;

/// How many prior turns accompany a new question.
pub const CONTEXT_TURNS: usize = 3;

/// Maximum characters kept from each prior turn in the context.
pub const TURN_CHAR_LIMIT: usize = 700;

/// Fixed instruction block sent ahead of every question.
pub const SYSTEM_PROMPT: &str = "\
You are an experienced Indian equity trader and fundamental analyst.

Answer every stock question with the following sections, using markdown tables:

**<COMPANY NAME> - Current Price: <currency><price>**

1. A four-column snapshot table headed VALUATION | PROFITABILITY | GROWTH | BALANCE SHEET,
   covering market cap, EPS, P/E, sector P/E, P/B, PEG; revenue, net profit, operating
   and net margin, ROE, ROCE; revenue CAGR, profit YoY, EPS and sales growth; debt/equity,
   current ratio, interest coverage, total debt, working capital.
2. **ANALYSIS**: a two-column table rating valuation, quality, growth momentum and
   financial health, one line of reasoning each.
3. **TRADING RECOMMENDATION**: call (BUY/SELL/HOLD), entry zone, 12-month target,
   stop loss and risk-reward.
4. **KEY RISKS**: two numbered risks.

Rules:
- Fill every cell with a specific figure.
- Use T for trillion, B for billion, Cr for crores.
- Use ₹ for Indian stocks and $ for US stocks.
- Keep each assessment to a single line.
- Always include entry, target and stop-loss prices.";

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One question or one answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Append-only, session-scoped list of turns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn at the end. Blank text is rejected.
    pub fn append(&mut self, role: Role, text: impl Into<String>) -> Result<(), DeskError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DeskError::EmptyTurn);
        }
        self.turns.push(ChatTurn::new(role, text));
        Ok(())
    }

    /// Drop every turn (explicit user action only).
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Build the message list for one outgoing question.
///
/// Layout: system block, up to [`CONTEXT_TURNS`] most recent prior
/// turns (each cut to [`TURN_CHAR_LIMIT`] characters), then the
/// question verbatim.
pub fn build_request_context(transcript: &Transcript, question: &str) -> Vec<ChatTurn> {
    let prior = transcript.turns();
    let start = prior.len().saturating_sub(CONTEXT_TURNS);

    let mut messages = Vec::with_capacity(prior.len() - start + 2);
    messages.push(ChatTurn::new(Role::System, SYSTEM_PROMPT));
    messages.extend(
        prior[start..]
            .iter()
            .map(|turn| ChatTurn::new(turn.role, truncate_chars(&turn.content, TURN_CHAR_LIMIT))),
    );
    messages.push(ChatTurn::new(Role::User, question));
    messages
}

/// First `limit` characters of `text` (Unicode scalar values).
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript_of(n: usize) -> Transcript {
        let mut t = Transcript::new();
        for i in 0..n {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            t.append(role, format!("turn {i}")).unwrap();
        }
        t
    }

    #[test]
    fn test_append_rejects_blank_text() {
        let mut t = Transcript::new();
        assert_eq!(t.append(Role::User, "   "), Err(DeskError::EmptyTurn));
        assert!(t.is_empty());
    }

    #[test]
    fn test_context_uses_last_three_turns() {
        let ctx = build_request_context(&transcript_of(10), "Analyze TCS");
        assert_eq!(ctx.len(), 5);
        assert_eq!(ctx[0].role, Role::System);
        assert_eq!(ctx[1].content, "turn 7");
        assert_eq!(ctx[2].content, "turn 8");
        assert_eq!(ctx[3].content, "turn 9");
        assert_eq!(ctx[4], ChatTurn::new(Role::User, "Analyze TCS"));
    }

    #[test]
    fn test_context_with_short_history() {
        assert_eq!(build_request_context(&Transcript::new(), "hi").len(), 2);
        assert_eq!(build_request_context(&transcript_of(2), "hi").len(), 4);
    }

    #[test]
    fn test_long_turn_truncated_to_limit() {
        let mut t = Transcript::new();
        t.append(Role::Assistant, "x".repeat(900)).unwrap();
        let ctx = build_request_context(&t, "next");
        assert_eq!(ctx[1].content.chars().count(), 700);
        assert_eq!(t.turns()[0].content.len(), 900);
    }

    #[test]
    fn test_question_not_truncated() {
        let question = "q".repeat(1200);
        let ctx = build_request_context(&Transcript::new(), &question);
        assert_eq!(ctx[1].content, question);
    }

    #[test]
    fn test_truncate_respects_multibyte_chars() {
        let text = "₹".repeat(10);
        assert_eq!(truncate_chars(&text, 4), "₹₹₹₹");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_clear_empties_transcript() {
        let mut t = transcript_of(4);
        t.clear();
        assert!(t.is_empty());
    }
}
