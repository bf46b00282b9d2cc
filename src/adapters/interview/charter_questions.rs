//! Built-in charter interview questions.
//!
//! Deterministic question provider covering every required field of every
//! stage. Later stages weave the recorded business objective into their
//! wording so the interview reads as one conversation rather than five
//! disconnected forms.

use crate::domain::foundation::Stage;
use crate::domain::session::StageData;
use crate::ports::{StageQuestion, StageQuestionProvider};

/// Default question set for the charter interview.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharterQuestionProvider;

impl CharterQuestionProvider {
    pub fn new() -> Self {
        Self
    }

    fn objective_clause(prior_stages: &StageData) -> String {
        prior_stages
            .get(&Stage::BusinessContext)
            .and_then(|d| d.field_text("business_objective"))
            .map(|objective| format!(" Keep your objective in mind: \"{}\".", objective))
            .unwrap_or_default()
    }
}

impl StageQuestionProvider for CharterQuestionProvider {
    fn questions(&self, stage: Stage, prior_stages: &StageData) -> Vec<StageQuestion> {
        let objective = Self::objective_clause(prior_stages);
        match stage {
            Stage::BusinessContext => vec![
                StageQuestion::new(
                    "business_objective",
                    "What is the primary objective of this venture? What outcome \
                     would make it a success?",
                ),
                StageQuestion::new(
                    "background",
                    "What is the background here? What led you to this idea, and \
                     what has been tried before?",
                ),
                StageQuestion::new(
                    "stakeholders",
                    "Who are the stakeholders? Name the people and groups affected \
                     by or invested in this venture.",
                ),
            ],
            Stage::MarketAnalysis => vec![
                StageQuestion::new(
                    "target_market",
                    format!("Who exactly is your target market?{}", objective),
                ),
                StageQuestion::new(
                    "competitors",
                    "Who are your competitors, direct and indirect?",
                ),
                StageQuestion::new(
                    "differentiation",
                    "What sets you apart from those competitors? Why would a \
                     customer pick you?",
                ),
            ],
            Stage::Offering => vec![
                StageQuestion::new(
                    "product_description",
                    format!("Describe the product or service you will offer.{}", objective),
                ),
                StageQuestion::new(
                    "key_features",
                    "What are the key features or capabilities, in priority order?",
                ),
                StageQuestion::new(
                    "pricing_model",
                    "How will you price it? One-time, subscription, usage-based?",
                ),
            ],
            Stage::OperatingModel => vec![
                StageQuestion::new(
                    "delivery_channels",
                    "Through which channels will you reach and serve customers?",
                ),
                StageQuestion::new(
                    "key_resources",
                    "What key resources does the operation depend on - people, \
                     tools, facilities?",
                ),
                StageQuestion::new(
                    "key_partners",
                    "Which partners or suppliers are essential to delivering?",
                ),
            ],
            Stage::FinancialOutlook => vec![
                StageQuestion::new(
                    "revenue_streams",
                    "What are your revenue streams, and roughly how much do you \
                     expect from each?",
                ),
                StageQuestion::new(
                    "cost_structure",
                    "What does the cost structure look like? Fixed versus variable.",
                ),
                StageQuestion::new(
                    "break_even_estimate",
                    "When do you estimate you will break even, and under what \
                     assumptions?",
                ),
            ],
        }
    }
}
