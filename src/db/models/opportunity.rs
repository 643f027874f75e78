//! Sales opportunity model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpportunityStage {
    Prospecting,
    Qualification,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
}

/// Product position on an opportunity, copied onto the order at conversion
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OpportunityItem {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub product: Option<RecordId>,
    #[validate(length(min = 1, max = 500))]
    pub name: String,
    #[validate(range(min = 1))]
    pub quantity: u32,
    #[validate(range(min = 0.0, max = 1_000_000.0))]
    pub unit_price: f64,
}

/// Logged touchpoint on an opportunity (call, meeting, note)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Activity {
    #[validate(length(min = 1, max = 50))]
    pub activity_type: String,
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub created_by: Option<RecordId>,
    pub created_at: DateTime<Utc>,
}

/// POST /api/sales/opportunities/{id}/activities
#[derive(Debug, Deserialize, Validate)]
pub struct ActivityCreate {
    #[validate(length(min = 1, max = 50))]
    pub activity_type: String,
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
}

/// Sales opportunity
///
/// Probability and stage are coupled: probability 100 forces `closed-won`,
/// probability 0 forces `closed-lost` for any stage past prospecting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub customer: Option<RecordId>,
    pub stage: OpportunityStage,
    pub amount: f64,
    pub probability: f64,
    #[serde(default)]
    pub expected_close_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub converted_to_order_id: Option<RecordId>,
    #[serde(default)]
    pub items: Vec<OpportunityItem>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub assigned_to: Option<RecordId>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub created_by: Option<RecordId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Opportunity {
    /// Enforce the probability/stage coupling in place
    pub fn apply_probability_rules(stage: OpportunityStage, probability: f64) -> OpportunityStage {
        if probability >= 100.0 {
            OpportunityStage::ClosedWon
        } else if probability <= 0.0 && stage != OpportunityStage::Prospecting {
            OpportunityStage::ClosedLost
        } else {
            stage
        }
    }
}

/// POST /api/sales/opportunities
#[derive(Debug, Deserialize, Validate)]
pub struct OpportunityCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub customer: Option<String>,
    #[serde(default = "default_stage")]
    pub stage: OpportunityStage,
    #[validate(range(min = 0.0))]
    pub amount: f64,
    #[serde(default = "default_probability")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub probability: f64,
    pub expected_close_date: Option<DateTime<Utc>>,
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<OpportunityItem>,
    pub notes: Option<String>,
    pub assigned_to: Option<String>,
}

fn default_stage() -> OpportunityStage {
    OpportunityStage::Prospecting
}

fn default_probability() -> f64 {
    10.0
}

/// PUT /api/sales/opportunities/{id}
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct OpportunityUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<OpportunityStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub probability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_close_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub items: Option<Vec<OpportunityItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probability_100_forces_closed_won() {
        let stage =
            Opportunity::apply_probability_rules(OpportunityStage::Negotiation, 100.0);
        assert_eq!(stage, OpportunityStage::ClosedWon);
    }

    #[test]
    fn probability_0_forces_closed_lost_after_prospecting() {
        let stage = Opportunity::apply_probability_rules(OpportunityStage::Proposal, 0.0);
        assert_eq!(stage, OpportunityStage::ClosedLost);

        // Prospecting with 0 probability stays prospecting
        let stage = Opportunity::apply_probability_rules(OpportunityStage::Prospecting, 0.0);
        assert_eq!(stage, OpportunityStage::Prospecting);
    }

    #[test]
    fn mid_probability_keeps_stage() {
        let stage = Opportunity::apply_probability_rules(OpportunityStage::Qualification, 40.0);
        assert_eq!(stage, OpportunityStage::Qualification);
    }

    #[test]
    fn stage_serializes_kebab_case() {
        let json = serde_json::to_string(&OpportunityStage::ClosedWon).unwrap();
        assert_eq!(json, "\"closed-won\"");
    }
}
