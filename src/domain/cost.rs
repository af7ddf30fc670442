//! Advisory chat cost estimate.
//!
//! A linear heuristic, not a measurement: every message is assumed to
//! cost 200 tokens, split 60/40 between input and output, priced from
//! a fixed per-model rate table. Display only; never gates requests.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Assumed tokens per transcript message.
pub const TOKENS_PER_MESSAGE: u64 = 200;

/// Message count past which the user is nudged to clear history.
pub const CLEAR_HISTORY_THRESHOLD: usize = 50;

/// Default USD → INR conversion.
pub const DEFAULT_EXCHANGE_RATE: Decimal = dec!(83);

const PER_MILLION: Decimal = dec!(1000000);

/// USD price per one million tokens, plus the advisory per-question cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelRate {
    pub input_per_million: Decimal,
    pub output_per_million: Decimal,
    pub cost_per_question: Decimal,
}

const DEFAULT_RATE: ModelRate = ModelRate {
    input_per_million: dec!(0.50),
    output_per_million: dec!(1.50),
    cost_per_question: dec!(0.0008),
};

/// Rate pair for a model identifier; unknown identifiers get the default.
pub fn rate_for(model: &str) -> ModelRate {
    match model {
        "gpt-4o-mini" => ModelRate {
            input_per_million: dec!(0.15),
            output_per_million: dec!(0.60),
            cost_per_question: dec!(0.0003),
        },
        "gpt-4" => ModelRate {
            input_per_million: dec!(30),
            output_per_million: dec!(60),
            cost_per_question: dec!(0.036),
        },
        "gpt-4-turbo" => ModelRate {
            input_per_million: dec!(10),
            output_per_million: dec!(30),
            cost_per_question: dec!(0.016),
        },
        _ => DEFAULT_RATE,
    }
}

/// Token and currency figures for the chat statistics panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostEstimate {
    pub model: String,
    pub message_count: usize,
    pub total_tokens: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub rate: ModelRate,
    pub input_cost_usd: Decimal,
    pub output_cost_usd: Decimal,
    pub total_cost_usd: Decimal,
    pub total_cost_inr: Decimal,
    pub cost_per_question_inr: Decimal,
    pub exchange_rate: Decimal,
    /// Set once the transcript reaches [`CLEAR_HISTORY_THRESHOLD`] messages.
    pub suggest_clear: bool,
}

/// Estimate the running cost of a transcript with `message_count` messages.
pub fn estimate_cost(message_count: usize, model: &str, exchange_rate: Decimal) -> CostEstimate {
    let rate = rate_for(model);
    let total_tokens = message_count as u64 * TOKENS_PER_MESSAGE;
    // Integer 60/40 split truncates like the display it feeds.
    let input_tokens = total_tokens * 6 / 10;
    let output_tokens = total_tokens * 4 / 10;

    let input_cost_usd = Decimal::from(input_tokens) / PER_MILLION * rate.input_per_million;
    let output_cost_usd = Decimal::from(output_tokens) / PER_MILLION * rate.output_per_million;
    let total_cost_usd = input_cost_usd + output_cost_usd;

    CostEstimate {
        model: model.to_string(),
        message_count,
        total_tokens,
        input_tokens,
        output_tokens,
        rate,
        input_cost_usd,
        output_cost_usd,
        total_cost_usd,
        total_cost_inr: total_cost_usd * exchange_rate,
        cost_per_question_inr: if message_count == 0 {
            Decimal::ZERO
        } else {
            rate.cost_per_question * exchange_rate
        },
        exchange_rate,
        suggest_clear: message_count >= CLEAR_HISTORY_THRESHOLD,
    }
}
