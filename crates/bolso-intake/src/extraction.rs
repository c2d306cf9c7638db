// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured transaction extraction on top of the AI provider.
//!
//! Model output is free text expected to hold one JSON object. Parsing is a
//! tagged result; nothing here turns bad output into an error.

use std::str::FromStr;
use std::sync::Arc;

use bolso_core::ProviderAdapter;
use bolso_core::types::{CandidateTransaction, Category, MediaPayload, TransactionKind};
use serde_json::Value;
use tracing::{debug, warn};

use crate::metrics;
use crate::prompt::build_request;

/// Confidence assumed when the model omits it or reports zero.
const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Validated extraction result.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub transactions: Vec<CandidateTransaction>,
    pub confidence: f64,
}

impl ExtractionResult {
    pub fn empty() -> Self {
        Self {
            transactions: Vec::new(),
            confidence: 0.0,
        }
    }
}

/// Outcome of parsing raw model output.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(ExtractionResult),
    /// Output had no usable JSON object; carries the reason.
    Malformed(String),
}

impl ParseOutcome {
    /// Collapse into a result, mapping `Malformed` to the empty result.
    pub fn into_result(self) -> ExtractionResult {
        match self {
            ParseOutcome::Parsed(result) => result,
            ParseOutcome::Malformed(_) => ExtractionResult::empty(),
        }
    }
}

/// Parse model output: the substring from the first `{` to the last `}`
/// must be a JSON object with a `transactions` array.
pub fn parse_response(raw: &str) -> ParseOutcome {
    let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) else {
        return ParseOutcome::Malformed("no JSON object in output".into());
    };
    if end < start {
        return ParseOutcome::Malformed("no JSON object in output".into());
    }

    let value: Value = match serde_json::from_str(&raw[start..=end]) {
        Ok(value) => value,
        Err(e) => return ParseOutcome::Malformed(format!("invalid JSON: {e}")),
    };
    let Some(items) = value.get("transactions").and_then(Value::as_array) else {
        return ParseOutcome::Malformed("missing transactions array".into());
    };

    let transactions: Vec<CandidateTransaction> = items.iter().filter_map(validate_item).collect();
    if transactions.is_empty() {
        return ParseOutcome::Parsed(ExtractionResult::empty());
    }

    let confidence = value
        .get("confidence")
        .and_then(Value::as_f64)
        .filter(|c| *c != 0.0)
        .unwrap_or(DEFAULT_CONFIDENCE);

    ParseOutcome::Parsed(ExtractionResult {
        transactions,
        confidence,
    })
}

fn validate_item(item: &Value) -> Option<CandidateTransaction> {
    let description = item.get("description")?.as_str()?.trim();
    if description.is_empty() {
        return None;
    }

    let amount = item.get("amount")?.as_f64()?;
    if !amount.is_finite() || amount <= 0.0 {
        return None;
    }

    let kind = TransactionKind::from_str(item.get("type")?.as_str()?).ok()?;
    let category = item
        .get("category")
        .and_then(Value::as_str)
        .and_then(|c| Category::from_str(c).ok());

    Some(CandidateTransaction {
        description: description.to_string(),
        amount,
        kind,
        category,
    })
}

/// Calls the provider once per message and validates its answer.
pub struct Extractor {
    provider: Arc<dyn ProviderAdapter>,
}

impl Extractor {
    pub fn new(provider: Arc<dyn ProviderAdapter>) -> Self {
        Self { provider }
    }

    /// Extract candidate transactions from text and/or media.
    ///
    /// Provider failures and malformed output yield the empty result.
    pub async fn extract(&self, text: Option<&str>, media: Option<&MediaPayload>) -> ExtractionResult {
        let request = build_request(text, media);
        let response = match self.provider.complete(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "extraction call failed");
                metrics::record_extraction_failure("provider");
                return ExtractionResult::empty();
            }
        };

        match parse_response(&response.text) {
            ParseOutcome::Parsed(result) => {
                debug!(
                    count = result.transactions.len(),
                    confidence = result.confidence,
                    "extraction parsed"
                );
                if !result.transactions.is_empty() {
                    metrics::record_confidence(result.confidence);
                }
                result
            }
            ParseOutcome::Malformed(reason) => {
                warn!(reason = %reason, "extraction output malformed");
                metrics::record_extraction_failure("malformed");
                ExtractionResult::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bolso_core::types::PromptPart;
    use bolso_test_utils::MockProvider;
    use proptest::prelude::*;

    #[test]
    fn parses_fenced_output() {
        let raw = "```json\n{\"transactions\": [{\"description\": \"Uber\", \"amount\": 50, \"type\": \"expense\", \"category\": \"variable_transport\"}], \"confidence\": 0.95}\n```";
        let ParseOutcome::Parsed(result) = parse_response(raw) else {
            panic!("expected parsed");
        };
        assert_eq!(result.confidence, 0.95);
        assert_eq!(
            result.transactions,
            vec![CandidateTransaction {
                description: "Uber".into(),
                amount: 50.0,
                kind: TransactionKind::Expense,
                category: Some(Category::VariableTransport),
            }]
        );
    }

    #[test]
    fn malformed_outputs() {
        for raw in [
            "",
            "sem transações",
            "} oops {",
            "{not json}",
            "{\"items\": []}",
            "{\"transactions\": {}}",
        ] {
            assert!(
                matches!(parse_response(raw), ParseOutcome::Malformed(_)),
                "{raw:?} should be malformed"
            );
        }
    }

    #[test]
    fn invalid_items_are_dropped() {
        let raw = r#"{"transactions": [
            {"description": "", "amount": 10, "type": "expense"},
            {"description": "Luz", "amount": 0, "type": "expense"},
            {"description": "Água", "amount": "80", "type": "expense"},
            {"description": "Pix", "amount": 10, "type": "transfer"},
            {"description": "  Mercado ", "amount": 120.5, "type": "expense", "category": "groceries"}
        ], "confidence": 0.7}"#;
        let result = parse_response(raw).into_result();
        assert_eq!(result.transactions.len(), 1);
        assert_eq!(result.transactions[0].description, "Mercado");
        assert_eq!(result.transactions[0].category, None);
    }

    #[test]
    fn confidence_defaults() {
        let item = r#"{"description": "Uber", "amount": 5, "type": "expense"}"#;
        for tail in ["", r#", "confidence": 0"#, r#", "confidence": "high""#] {
            let raw = format!(r#"{{"transactions": [{item}]{tail}}}"#);
            assert_eq!(parse_response(&raw).into_result().confidence, 0.5, "{raw}");
        }
    }

    #[test]
    fn empty_list_has_zero_confidence() {
        let result = parse_response(r#"{"transactions": [], "confidence": 0.9}"#).into_result();
        assert_eq!(result, ExtractionResult::empty());
    }

    proptest! {
        #[test]
        fn non_positive_amounts_never_survive(amount in -1.0e6f64..=0.0) {
            let raw = format!(
                r#"{{"transactions": [{{"description": "x", "amount": {amount}, "type": "income"}}]}}"#
            );
            prop_assert!(parse_response(&raw).into_result().transactions.is_empty());
        }

        #[test]
        fn arbitrary_text_never_panics(raw in ".*") {
            let _ = parse_response(&raw);
        }
    }

    #[tokio::test]
    async fn provider_error_yields_empty() {
        let provider = Arc::new(MockProvider::new());
        provider.add_error("quota exceeded").await;
        let result = Extractor::new(provider).extract(Some("gastei 50"), None).await;
        assert_eq!(result, ExtractionResult::empty());
    }

    #[tokio::test]
    async fn sends_user_text_in_prompt() {
        let provider = Arc::new(MockProvider::with_responses(vec![
            r#"{"transactions": [{"description": "Uber", "amount": 50, "type": "expense"}], "confidence": 0.9}"#.into(),
        ]));
        let result = Extractor::new(provider.clone())
            .extract(Some("gastei 50 no uber"), None)
            .await;
        assert_eq!(result.transactions.len(), 1);

        let requests = provider.requests().await;
        assert_eq!(
            requests[0].parts[1],
            PromptPart::Text("\n\nEntrada do usuário: gastei 50 no uber".into())
        );
    }
}
