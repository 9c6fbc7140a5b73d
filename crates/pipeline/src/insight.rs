//! Prompt construction for the investment-insight request.

use crate::{CompletionRequest, Concept};

/// Fixed role instruction sent with every insight request.
pub const SYSTEM_INSTRUCTION: &str =
    "You are an expert investment analyst specializing in emerging technology markets.";

/// Builds the completion request asking for a qualitative investment
/// assessment of `concept`, grounded in the formatted research data.
pub fn insight_request(concept: &Concept, research_data: &str) -> CompletionRequest {
    let user_prompt = format!(
        "As an investment analyst, analyze the following research landscape data for {concept} \
         and provide strategic investment insights.\n\
         Focus on:\n\
         1. Market maturity and growth potential\n\
         2. Key players and institutional involvement\n\
         3. Research momentum and emerging trends\n\
         4. Potential investment opportunities and risks\n\
         5. Recommendations for investors\n\
         \n\
         Research Data:\n\
         {research_data}\n\
         \n\
         Provide a concise, actionable analysis for investors considering this space.\n"
    );

    CompletionRequest {
        system_instruction: SYSTEM_INSTRUCTION.to_string(),
        user_prompt,
    }
}
