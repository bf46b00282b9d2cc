//! Stage enum representing the fixed interview pipeline.
//!
//! Every session walks the same five topic-scoped sub-interviews in order.
//! Stage numbers are 1-based because they are user-facing and appear in
//! checkpoint filenames.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// The 5 interview stages, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    BusinessContext,
    MarketAnalysis,
    Offering,
    OperatingModel,
    FinancialOutlook,
}

impl Stage {
    /// Returns all stages in pipeline order.
    pub fn all() -> &'static [Stage] {
        &[
            Stage::BusinessContext,
            Stage::MarketAnalysis,
            Stage::Offering,
            Stage::OperatingModel,
            Stage::FinancialOutlook,
        ]
    }

    /// Returns the first stage of the pipeline.
    pub fn first() -> Stage {
        Stage::BusinessContext
    }

    /// Returns the 1-based stage number.
    pub fn number(&self) -> u8 {
        match self {
            Stage::BusinessContext => 1,
            Stage::MarketAnalysis => 2,
            Stage::Offering => 3,
            Stage::OperatingModel => 4,
            Stage::FinancialOutlook => 5,
        }
    }

    /// Looks a stage up by its 1-based number.
    pub fn from_number(number: u8) -> Result<Stage, ValidationError> {
        Self::all()
            .iter()
            .find(|s| s.number() == number)
            .copied()
            .ok_or_else(|| {
                ValidationError::out_of_range("stage_number", 1.0, 5.0, number as f64)
            })
    }

    /// Returns the next stage in the pipeline, if any.
    pub fn next(&self) -> Option<Stage> {
        let idx = Self::all().iter().position(|s| s == self)?;
        Self::all().get(idx + 1).copied()
    }

    /// Returns true if this stage comes before another in the pipeline.
    pub fn is_before(&self, other: &Stage) -> bool {
        self.number() < other.number()
    }

    /// Returns true if this is the final stage of the pipeline.
    pub fn is_last(&self) -> bool {
        self.next().is_none()
    }

    /// Returns the fields a deliverable for this stage must carry to pass
    /// its gate.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Stage::BusinessContext => &["business_objective", "background", "stakeholders"],
            Stage::MarketAnalysis => &["target_market", "competitors", "differentiation"],
            Stage::Offering => &["product_description", "key_features", "pricing_model"],
            Stage::OperatingModel => &["delivery_channels", "key_resources", "key_partners"],
            Stage::FinancialOutlook => &["revenue_streams", "cost_structure", "break_even_estimate"],
        }
    }

    /// Returns the display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::BusinessContext => "Business Context",
            Stage::MarketAnalysis => "Market Analysis",
            Stage::Offering => "Offering",
            Stage::OperatingModel => "Operating Model",
            Stage::FinancialOutlook => "Financial Outlook",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_returns_5_stages() {
        assert_eq!(Stage::all().len(), 5);
    }

    #[test]
    fn all_returns_stages_in_order() {
        let all = Stage::all();
        assert_eq!(all[0], Stage::BusinessContext);
        assert_eq!(all[1], Stage::MarketAnalysis);
        assert_eq!(all[2], Stage::Offering);
        assert_eq!(all[3], Stage::OperatingModel);
        assert_eq!(all[4], Stage::FinancialOutlook);
    }

    #[test]
    fn numbers_are_contiguous_from_one() {
        for (idx, stage) in Stage::all().iter().enumerate() {
            assert_eq!(stage.number() as usize, idx + 1);
        }
    }

    #[test]
    fn from_number_roundtrips() {
        for stage in Stage::all() {
            assert_eq!(Stage::from_number(stage.number()), Ok(*stage));
        }
    }

    #[test]
    fn from_number_rejects_out_of_range() {
        assert!(Stage::from_number(0).is_err());
        assert!(Stage::from_number(6).is_err());
    }

    #[test]
    fn next_walks_the_pipeline() {
        assert_eq!(Stage::BusinessContext.next(), Some(Stage::MarketAnalysis));
        assert_eq!(Stage::OperatingModel.next(), Some(Stage::FinancialOutlook));
    }

    #[test]
    fn next_returns_none_for_last() {
        assert_eq!(Stage::FinancialOutlook.next(), None);
        assert!(Stage::FinancialOutlook.is_last());
    }

    #[test]
    fn is_before_works_correctly() {
        assert!(Stage::BusinessContext.is_before(&Stage::Offering));
        assert!(!Stage::Offering.is_before(&Stage::BusinessContext));
        assert!(!Stage::Offering.is_before(&Stage::Offering));
    }

    #[test]
    fn every_stage_has_required_fields() {
        for stage in Stage::all() {
            assert!(
                !stage.required_fields().is_empty(),
                "{:?} should declare required fields",
                stage
            );
        }
    }

    #[test]
    fn business_context_requires_business_objective() {
        assert!(Stage::BusinessContext
            .required_fields()
            .contains(&"business_objective"));
    }

    #[test]
    fn serializes_to_snake_case_json() {
        let json = serde_json::to_string(&Stage::BusinessContext).unwrap();
        assert_eq!(json, "\"business_context\"");

        let json = serde_json::to_string(&Stage::FinancialOutlook).unwrap();
        assert_eq!(json, "\"financial_outlook\"");
    }

    #[test]
    fn deserializes_from_snake_case_json() {
        let stage: Stage = serde_json::from_str("\"market_analysis\"").unwrap();
        assert_eq!(stage, Stage::MarketAnalysis);
    }

    #[test]
    fn ord_matches_pipeline_order() {
        assert!(Stage::BusinessContext < Stage::MarketAnalysis);
        assert!(Stage::OperatingModel < Stage::FinancialOutlook);
    }
}
