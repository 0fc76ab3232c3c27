//! Instructor qualification model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use super::text_enum;

text_enum! {
    QualificationPath, "qualification path" {
        ActiveBcba => "active_bcba",
        DoctorateBehaviorAnalysis => "doctorate_behavior_analysis",
        DoctorateWithCoursework => "doctorate_with_coursework",
        DoctorateWithMentorship => "doctorate_with_mentorship",
        DoctorateWithPublications => "doctorate_with_publications",
        DoctorateWithPostdocHours => "doctorate_with_postdoc_hours",
    }
}

text_enum! {
    ExpertiseBasis, "expertise basis" {
        FiveYearsPractice => "five_years_practice",
        ThreeYearsTeaching => "three_years_teaching",
        PublishedResearch => "published_research",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InstructorQualification {
    pub id: i64,
    pub user_id: i64,
    pub provider_id: i64,
    pub is_bcba: bool,
    pub is_bcba_d: bool,
    pub is_phd_aba: bool,
    pub certification_number: Option<String>,
    pub certification_date: Option<DateTime<Utc>>,
    pub certification_expiration: Option<DateTime<Utc>>,
    pub cv_url: Option<String>,
    pub certification_proof_url: Option<String>,
    pub qualification_path: Option<String>,
    pub expertise_basis: Option<String>,
    pub years_experience_in_subject: Option<i32>,
    pub years_teaching_subject: Option<i32>,
    pub verified_by: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub is_approved: bool,
    pub qualification_review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InstructorQualification {
    /// Reviewed and not approved
    pub fn is_rejected(&self) -> bool {
        !self.is_approved && self.verified_at.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitQualificationRequest {
    pub user_id: Option<i64>,
    pub provider_id: Option<i64>,
    #[serde(default)]
    pub is_bcba: bool,
    #[serde(default)]
    pub is_bcba_d: bool,
    #[serde(default)]
    pub is_phd_aba: bool,
    pub certification_number: Option<String>,
    pub certification_date: Option<DateTime<Utc>>,
    pub certification_expiration: Option<DateTime<Utc>>,
    pub cv_url: Option<String>,
    pub certification_proof_url: Option<String>,
    pub qualification_path: Option<QualificationPath>,
    pub expertise_basis: Option<ExpertiseBasis>,
    pub years_experience_in_subject: Option<i32>,
    pub years_teaching_subject: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewQualificationRequest {
    pub notes: Option<String>,
}
