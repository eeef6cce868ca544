//! Prompt construction and reply parsing for the AI routes.
//!
//! Three flows share the Gemini client:
//! - financial insights: totals in, three numbered sections out;
//! - intent classification: free-text question in, strict JSON out;
//! - general questions: short answer returned verbatim.

use regex::{Regex, RegexBuilder};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::error::AppResult;
use crate::models::money::{decimal_from_cents, format_cents};
use crate::models::{
    Expense, FinancialSummary, Income, InsightMode, InsightResult, InsightSection,
    IntentCategory, IntentResult, ParsedReply, QueryAnswer, NO_INSIGHTS,
};
use crate::services::ai_client::{AiError, GeminiClient};
use crate::services::aggregator;

/// Most recent expenses included in an analysis prompt.
pub const MAX_ANALYZED_EXPENSES: usize = 200;

pub const NOT_IMPLEMENTED_MESSAGE: &str =
    "Budget and savings questions are not supported yet.";
pub const CLARIFY_MESSAGE: &str = "I couldn't tell what you are asking about. Could you rephrase, \
     for example \"How much did I spend on dining?\"";
pub const OUT_OF_SCOPE_MESSAGE: &str =
    "I can only answer questions about your expenses and income.";

// ---------------------------------------------------------------------------
// Financial insights
// ---------------------------------------------------------------------------

pub fn build_insight_prompt(summary: &FinancialSummary, mode: InsightMode) -> String {
    let sections: String = InsightSection::ALL
        .iter()
        .map(|s| format!("{}. {}.", s.number(), s.title()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Based on the user's total income (${}) and total expenses (${}), \
         provide financial insights including:\n{}\n\n{}\n\
         Start each section with its numbered heading exactly as written above.",
        format_cents(summary.total_income_cents),
        format_cents(summary.total_expenses_cents),
        sections,
        mode.guidance(),
    )
}

static SECTION_HEADINGS: LazyLock<Vec<(InsightSection, Regex)>> = LazyLock::new(|| {
    InsightSection::ALL
        .iter()
        .map(|section| {
            let title = section
                .title()
                .split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+");
            // The leading group keeps "11. ..." from matching section 1.
            let pattern = format!(
                r"(?:^|[^0-9])(?P<heading>{}\s*[.)]\s*(?:\*\*|__)?\s*{})",
                section.number(),
                title
            );
            let regex = RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .expect("section heading pattern is valid");
            (*section, regex)
        })
        .collect()
});

fn clean_section_body(raw: &str) -> &str {
    raw.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '*' | '_' | '.'))
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '_' | '#'))
}

/// Map each numbered heading found in `text` to the trimmed text between it
/// and the next recognised heading (or the end of the text).
///
/// Sections whose heading is absent, or whose body is empty, are left out.
pub fn extract_sections(text: &str) -> BTreeMap<InsightSection, String> {
    let mut found: Vec<(InsightSection, usize, usize)> = SECTION_HEADINGS
        .iter()
        .filter_map(|(section, regex)| {
            let heading = regex.captures(text)?.name("heading")?;
            Some((*section, heading.start(), heading.end()))
        })
        .collect();
    found.sort_by_key(|(_, start, _)| *start);

    let mut sections = BTreeMap::new();
    for (i, (section, _, body_start)) in found.iter().enumerate() {
        let body_end = found
            .get(i + 1)
            .map(|(_, next_start, _)| *next_start)
            .unwrap_or(text.len())
            .max(*body_start);
        let body = clean_section_body(&text[*body_start..body_end]);
        if !body.is_empty() {
            sections.insert(*section, body.to_string());
        }
    }
    sections
}

/// Build the insight fields, using the sentinel for any missing section.
pub fn parse_insights(text: &str) -> InsightResult {
    let mut sections = extract_sections(text);
    if sections.len() < InsightSection::ALL.len() {
        debug!(
            found = sections.len(),
            "Completion is missing insight sections, using placeholders"
        );
    }

    let mut take = |section: InsightSection| {
        sections
            .remove(&section)
            .unwrap_or_else(|| NO_INSIGHTS.to_string())
    };
    InsightResult {
        smart_saving_tips: take(InsightSection::SmartSavingTips),
        alternative_expenses: take(InsightSection::AlternativeExpenses),
        investment_recommendations: take(InsightSection::InvestmentRecommendations),
    }
}

pub async fn financial_insights(
    client: &GeminiClient,
    summary: &FinancialSummary,
    mode: InsightMode,
) -> Result<InsightResult, AiError> {
    let prompt = build_insight_prompt(summary, mode);
    let completion = client.generate(&prompt).await?;
    Ok(parse_insights(&completion))
}

// ---------------------------------------------------------------------------
// Intent classification
// ---------------------------------------------------------------------------

pub fn build_intent_prompt(query: &str) -> String {
    format!(
        r#"You classify questions sent to a personal finance assistant.
Respond with strict JSON only: no markdown, no code fences, no commentary.
Use exactly this shape:
{{"category": "expenses" | "income" | "budget" | "savings" | "unknown", "specificExpenseCategory": string or null, "timePeriod": string or null, "action": string or null}}

- "specificExpenseCategory" names the spending category asked about (for example "dining"), or null.
- "timePeriod" is the period mentioned (for example "last month"), or null.
- "action" is what the user wants done (for example "total"), or null.
- Use "unknown" when the question is about personal finance but the topic is unclear.

Question: {}"#,
        json!(query)
    )
}

/// Remove a surrounding markdown code fence (with or without a language tag).
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the language tag line, if any.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Parse the classifier reply. Anything but a well-formed intent object fails.
pub fn parse_intent(text: &str) -> ParsedReply<IntentResult> {
    let stripped = strip_code_fence(text);
    match serde_json::from_str::<IntentResult>(stripped) {
        Ok(intent) => ParsedReply::Parsed(intent),
        Err(e) => {
            warn!(error = %e, "Intent reply is not valid JSON");
            ParsedReply::ExtractionFailed(format!("invalid intent JSON: {}", e))
        }
    }
}

pub async fn classify_intent(
    client: &GeminiClient,
    query: &str,
) -> Result<ParsedReply<IntentResult>, AiError> {
    let completion = client.generate(&build_intent_prompt(query)).await?;
    Ok(parse_intent(&completion))
}

/// Answer a classified question from the user's records.
pub fn answer_intent(
    intent: &IntentResult,
    incomes: &[Income],
    expenses: &[Expense],
) -> AppResult<QueryAnswer> {
    debug!(
        category = ?intent.category,
        time_period = ?intent.time_period,
        action = ?intent.action,
        "Dispatching intent"
    );

    let answer = match intent.category {
        IntentCategory::Expenses => {
            let category = intent
                .specific_expense_category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty());
            let total = aggregator::category_total(expenses, category)?;
            let message = (total == 0).then(|| match category {
                Some(name) => format!("You haven't spent anything on {}.", name),
                None => "You haven't recorded any expenses yet.".to_string(),
            });

            QueryAnswer {
                intent: IntentCategory::Expenses,
                category: Some(category.unwrap_or("all").to_string()),
                total_spent: Some(decimal_from_cents(total)),
                total_income: None,
                message,
            }
        }
        IntentCategory::Income => {
            let summary = aggregator::summarize(incomes, &[])?;
            QueryAnswer {
                intent: IntentCategory::Income,
                category: None,
                total_spent: None,
                total_income: Some(summary.total_income()),
                message: None,
            }
        }
        IntentCategory::Budget | IntentCategory::Savings => {
            QueryAnswer::message(intent.category, NOT_IMPLEMENTED_MESSAGE)
        }
        IntentCategory::Unknown => QueryAnswer::message(IntentCategory::Unknown, CLARIFY_MESSAGE),
        IntentCategory::Other => QueryAnswer::message(IntentCategory::Other, OUT_OF_SCOPE_MESSAGE),
    };
    Ok(answer)
}

// ---------------------------------------------------------------------------
// Free-form answers
// ---------------------------------------------------------------------------

pub fn build_general_prompt(query: &str) -> String {
    format!(
        "Answer the following general personal finance question in no more than 3 lines. \
         Give general guidance only: do not ask for, assume, or refer to any personal \
         financial data.\n\nQuestion: {}",
        query
    )
}

pub async fn answer_general(client: &GeminiClient, query: &str) -> Result<String, AiError> {
    client.generate(&build_general_prompt(query)).await
}

pub fn build_analysis_prompt(expenses: &[Expense]) -> String {
    let items: Vec<_> = expenses
        .iter()
        .take(MAX_ANALYZED_EXPENSES)
        .map(|e| {
            json!({
                "category": e.category,
                "amount": format_cents(e.amount_cents),
                "date": e.date,
                "description": e.description,
            })
        })
        .collect();

    format!(
        "Analyze these expenses and suggest savings: {}",
        serde_json::Value::Array(items)
    )
}

pub async fn analyze_expenses(
    client: &GeminiClient,
    expenses: &[Expense],
) -> Result<String, AiError> {
    client.generate(&build_analysis_prompt(expenses)).await
}
