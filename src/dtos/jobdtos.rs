use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    models::{
        interactionmodel::{InteractionCounts, InteractionStatus},
        jobmodel::*,
        reviewmodel::ReviewAnswers,
    },
    service::status::{DerivedLabel, ProfessionalStatus},
};

// Job DTOs
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobDto {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: String,

    #[validate(length(min = 10, max = 2000, message = "Description must be between 10 and 2000 characters"))]
    pub description: String,

    pub category_id: Option<Uuid>,

    #[validate(range(min = 0.0, message = "Budget must be positive"))]
    pub budget: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CloseJobDto {
    #[validate(length(min = 1, max = 500, message = "A reason is required to close a job"))]
    pub reason: String,
}

// Offer DTOs
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OfferItemDto {
    #[validate(length(min = 1, message = "Item description is required"))]
    pub description: String,

    #[validate(range(min = 0.0, message = "Quantity must be positive"))]
    pub quantity: f64,

    #[validate(range(min = 0.0, message = "Unit price must be positive"))]
    pub unit_price: f64,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOfferDto {
    #[validate(range(min = 0.01, message = "Offer amount must be greater than zero"))]
    pub amount: f64,

    #[validate(length(max = 2500, message = "Offer description is too long"))]
    #[serde(default)]
    pub description: String,

    #[validate]
    #[serde(default)]
    pub items: Vec<OfferItemDto>,

    #[validate(range(min = 1, max = 365, message = "Estimated days must be between 1 and 365"))]
    pub estimated_days: Option<i32>,
}

impl SubmitOfferDto {
    pub fn terms(&self) -> OfferTerms {
        OfferTerms {
            description: self.description.clone(),
            items: self
                .items
                .iter()
                .map(|item| OfferItem {
                    description: item.description.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                })
                .collect(),
            estimated_days: self.estimated_days,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignProfessionalDto {
    pub professional_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RejectOfferDto {
    #[validate(length(min = 1, max = 500, message = "A rejection reason is required"))]
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobIdResponse {
    pub job_id: Uuid,
}

// Review DTOs
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RateMutualDto {
    pub reviewee_id: Uuid,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    #[validate(length(max = 1000, message = "Comment must be at most 1000 characters"))]
    #[serde(default)]
    pub comment: String,

    #[serde(default)]
    pub answers: ReviewAnswersDto,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAnswersDto {
    pub punctuality: Option<i32>,
    pub quality: Option<i32>,
    pub communication: Option<i32>,
    pub would_repeat: Option<bool>,
}

impl From<ReviewAnswersDto> for ReviewAnswers {
    fn from(dto: ReviewAnswersDto) -> Self {
        ReviewAnswers {
            punctuality: dto.punctuality,
            quality: dto.quality,
            communication: dto.communication,
            would_repeat: dto.would_repeat,
        }
    }
}

// Interaction DTOs
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionDto {
    pub status: InteractionStatus,
    #[serde(default)]
    pub has_unread: bool,
}

// Read models
/// A job as returned to a specific viewer. The calculated labels are never stored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobView {
    #[serde(flatten)]
    pub job: Job,
    pub calculated_client_status: DerivedLabel,
    pub calculated_pro_status: DerivedLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction_counts: Option<InteractionCounts>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminJobStatuses {
    pub job_id: Uuid,
    pub calculated_client_status: DerivedLabel,
    pub professionals: Vec<ProfessionalStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_payload_accepts_camel_case_and_builds_terms() {
        let dto: SubmitOfferDto = serde_json::from_value(serde_json::json!({
            "amount": 150.0,
            "description": "Replace two sockets",
            "items": [{ "description": "Socket", "quantity": 2.0, "unitPrice": 12.5 }],
            "estimatedDays": 1
        }))
        .unwrap();

        assert!(dto.validate().is_ok());
        let terms = dto.terms();
        assert_eq!(terms.items[0].unit_price, 12.5);
        assert_eq!(terms.estimated_days, Some(1));
    }

    #[test]
    fn non_positive_offer_fails_validation() {
        let dto = SubmitOfferDto {
            amount: 0.0,
            description: String::new(),
            items: vec![],
            estimated_days: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn job_view_flattens_job_and_adds_labels() {
        let mut job = Job::new(
            Uuid::new_v4(),
            "Move piano".into(),
            "Third floor, no lift".into(),
            None,
            None,
        );
        let pro_id = Uuid::new_v4();
        let terms = OfferTerms {
            estimated_days: Some(2),
            ..OfferTerms::default()
        };
        job.offers.0.push(Offer::new(pro_id, 90.0, terms));
        let view = JobView {
            job,
            calculated_client_status: DerivedLabel::Nueva,
            calculated_pro_status: DerivedLabel::Abierta,
            interaction_counts: None,
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["calculatedClientStatus"], "NUEVA");
        assert_eq!(json["calculatedProStatus"], "ABIERTA");
        assert_eq!(json["lifecycleStatus"], "active");
        assert_eq!(json["clientFinished"], false);
        assert_eq!(json["offers"][0]["proId"], pro_id.to_string());
        assert_eq!(json["offers"][0]["terms"]["estimatedDays"], 2);
        assert!(json.get("lifecycle_status").is_none());
        assert!(json.get("interactionCounts").is_none());
    }
}
