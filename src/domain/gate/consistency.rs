//! Cross-stage consistency checking.
//!
//! Deterministic keyword rules over the accumulated stage data. Findings
//! are a signal for the charter's readers, not a verdict: a failing report
//! never invalidates checkpoints already written.

use once_cell::sync::Lazy;

use crate::domain::foundation::Stage;
use crate::domain::session::{StageData, StageDeliverable};

static RECURRING_TERMS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["subscription", "recurring", "retainer", "membership"]);

static LOW_PRICE_TERMS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["cheapest", "low cost", "low-cost", "budget", "discount"]);

static PREMIUM_TERMS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["premium", "luxury", "high-end", "white glove"]);

/// Outcome of a cross-stage consistency check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyReport {
    is_consistent: bool,
    issues: Vec<String>,
    recommendations: Vec<String>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.is_consistent
    }

    pub fn issues(&self) -> &[String] {
        &self.issues
    }

    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }
}

/// Runs deterministic consistency rules across completed stages.
#[derive(Debug, Default)]
pub struct ConsistencyChecker;

impl ConsistencyChecker {
    pub fn new() -> Self {
        Self
    }

    /// Checks the accumulated stage data for cross-stage contradictions.
    ///
    /// Rules only fire when both sides of a comparison are present, so the
    /// checker is usable on partial data even though the orchestrator only
    /// calls it once every stage has completed.
    pub fn check(&self, stage_data: &StageData) -> ConsistencyReport {
        let mut issues = Vec::new();
        let mut recommendations = Vec::new();

        for stage in Stage::all().iter().copied() {
            if !stage_data.contains_key(&stage) {
                issues.push(format!(
                    "stage '{}' has no deliverable yet",
                    stage.display_name()
                ));
            }
        }

        self.check_pricing_against_revenue(stage_data, &mut issues, &mut recommendations);
        self.check_positioning_against_pricing(stage_data, &mut issues, &mut recommendations);
        self.collect_escalations(stage_data, &mut recommendations);

        let is_consistent = issues.is_empty();
        if !is_consistent {
            tracing::info!(issues = issues.len(), "consistency check found issues");
        }

        ConsistencyReport {
            is_consistent,
            issues,
            recommendations,
        }
    }

    /// A recurring pricing model needs recurring revenue streams, and a
    /// revenue plan built on recurring income needs a pricing model that
    /// produces it.
    fn check_pricing_against_revenue(
        &self,
        stage_data: &StageData,
        issues: &mut Vec<String>,
        recommendations: &mut Vec<String>,
    ) {
        let pricing = field_text(stage_data, Stage::Offering, "pricing_model");
        let revenue = field_text(stage_data, Stage::FinancialOutlook, "revenue_streams");
        let (Some(pricing), Some(revenue)) = (pricing, revenue) else {
            return;
        };

        let pricing_recurring = mentions_any(&pricing, &RECURRING_TERMS);
        let revenue_recurring = mentions_any(&revenue, &RECURRING_TERMS);
        if pricing_recurring && !revenue_recurring {
            issues.push(
                "pricing model is recurring but revenue streams list no recurring income"
                    .to_string(),
            );
            recommendations
                .push("add the recurring revenue the pricing model implies".to_string());
        } else if revenue_recurring && !pricing_recurring {
            issues.push(
                "revenue streams rely on recurring income the pricing model does not produce"
                    .to_string(),
            );
            recommendations
                .push("align the pricing model with the recurring revenue plan".to_string());
        }
    }

    /// A differentiation story built on price cannot coexist with premium
    /// pricing.
    fn check_positioning_against_pricing(
        &self,
        stage_data: &StageData,
        issues: &mut Vec<String>,
        recommendations: &mut Vec<String>,
    ) {
        let differentiation = field_text(stage_data, Stage::MarketAnalysis, "differentiation");
        let pricing = field_text(stage_data, Stage::Offering, "pricing_model");
        let (Some(differentiation), Some(pricing)) = (differentiation, pricing) else {
            return;
        };

        if mentions_any(&differentiation, &LOW_PRICE_TERMS) && mentions_any(&pricing, &PREMIUM_TERMS)
        {
            issues.push(
                "market differentiation claims low price while the pricing model is premium"
                    .to_string(),
            );
            recommendations
                .push("pick one positioning: price leadership or premium value".to_string());
        }
    }

    fn collect_escalations(&self, stage_data: &StageData, recommendations: &mut Vec<String>) {
        for deliverable in stage_data.values() {
            for field in deliverable.escalated_fields() {
                recommendations.push(format!(
                    "answer for '{}' in stage '{}' never cleared the quality bar; review it",
                    field,
                    deliverable.stage().display_name()
                ));
            }
        }
    }
}

fn field_text(stage_data: &StageData, stage: Stage, field: &str) -> Option<String> {
    stage_data
        .get(&stage)
        .and_then(|d: &StageDeliverable| d.field_text(field))
        .map(|s| s.to_lowercase())
}

fn mentions_any(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| text.contains(term))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};

    fn deliverable_with(
        stage: Stage,
        overrides: &[(&str, &str)],
        escalated: &[&str],
    ) -> StageDeliverable {
        let mut fields: BTreeMap<String, serde_json::Value> = stage
            .required_fields()
            .iter()
            .map(|f| (f.to_string(), serde_json::json!("a reasonable answer")))
            .collect();
        for (k, v) in overrides {
            fields.insert(k.to_string(), serde_json::json!(v));
        }
        let escalated = escalated.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>();
        StageDeliverable::new(stage, fields, escalated, vec![]).unwrap()
    }

    fn full_pipeline(overrides: &[(Stage, &str, &str)]) -> StageData {
        let mut data = StageData::new();
        for stage in Stage::all().iter().copied() {
            let stage_overrides: Vec<(&str, &str)> = overrides
                .iter()
                .filter(|(s, _, _)| *s == stage)
                .map(|(_, k, v)| (*k, *v))
                .collect();
            data.insert(stage, deliverable_with(stage, &stage_overrides, &[]));
        }
        data
    }

    #[test]
    fn coherent_pipeline_is_consistent() {
        let data = full_pipeline(&[
            (Stage::Offering, "pricing_model", "monthly subscription at 29 eur"),
            (
                Stage::FinancialOutlook,
                "revenue_streams",
                "subscription revenue plus setup fees",
            ),
        ]);
        let report = ConsistencyChecker::new().check(&data);
        assert!(report.is_consistent());
        assert!(report.issues().is_empty());
    }

    #[test]
    fn missing_stage_is_reported() {
        let mut data = full_pipeline(&[]);
        data.remove(&Stage::OperatingModel);
        let report = ConsistencyChecker::new().check(&data);
        assert!(!report.is_consistent());
        assert!(report.issues()[0].contains("Operating Model"));
    }

    #[test]
    fn recurring_pricing_without_recurring_revenue_is_flagged() {
        let data = full_pipeline(&[
            (Stage::Offering, "pricing_model", "annual subscription"),
            (
                Stage::FinancialOutlook,
                "revenue_streams",
                "one-off consulting projects",
            ),
        ]);
        let report = ConsistencyChecker::new().check(&data);
        assert!(!report.is_consistent());
        assert!(report.issues()[0].contains("recurring"));
        assert!(!report.recommendations().is_empty());
    }

    #[test]
    fn price_positioning_against_premium_pricing_is_flagged() {
        let data = full_pipeline(&[
            (
                Stage::MarketAnalysis,
                "differentiation",
                "we are the cheapest option in town",
            ),
            (Stage::Offering, "pricing_model", "premium flat fee"),
        ]);
        let report = ConsistencyChecker::new().check(&data);
        assert!(!report.is_consistent());
    }

    #[test]
    fn escalated_fields_yield_review_recommendations() {
        let mut data = full_pipeline(&[]);
        data.insert(
            Stage::BusinessContext,
            deliverable_with(Stage::BusinessContext, &[], &["background"]),
        );
        let report = ConsistencyChecker::new().check(&data);
        assert!(report.is_consistent());
        assert!(report
            .recommendations()
            .iter()
            .any(|r| r.contains("background")));
    }

    #[test]
    fn rules_skip_when_one_side_is_absent() {
        let mut data = StageData::new();
        data.insert(
            Stage::Offering,
            deliverable_with(Stage::Offering, &[("pricing_model", "subscription")], &[]),
        );
        let report = ConsistencyChecker::new().check(&data);
        // Missing stages are issues, but the pricing rule itself must not fire.
        assert!(!report
            .issues()
            .iter()
            .any(|i| i.contains("recurring income")));
    }
}
