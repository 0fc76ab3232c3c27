//! Provider repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Duration, Utc};
use crate::models::provider::{Provider, CreateProviderRequest, UpdateProviderRequest, PaymentType};
use crate::utils::errors::AceError;

#[derive(Clone)]
#[derive(Debug)]
pub struct ProviderRepository {
    pool: PgPool,
}

impl ProviderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a provider application; inactive until approved
    pub async fn create(&self, request: CreateProviderRequest) -> Result<Provider, AceError> {
        let now = Utc::now();
        let provider = sqlx::query_as::<_, Provider>(
            r#"
            INSERT INTO providers (provider_name, provider_type, coordinator_id, coordinator_years_certified,
                coordinator_certification_date, coordinator_certification_expires, primary_email, primary_phone,
                website, ein, leadership_name, application_date, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, FALSE, $12, $12)
            RETURNING *
            "#
        )
        .bind(request.provider_name)
        .bind(request.provider_type.as_str())
        .bind(request.coordinator_id)
        .bind(request.coordinator_years_certified)
        .bind(request.coordinator_certification_date)
        .bind(request.coordinator_certification_expires)
        .bind(request.primary_email)
        .bind(request.primary_phone)
        .bind(request.website)
        .bind(request.ein)
        .bind(request.leadership_name)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(provider)
    }

    /// Find provider by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Provider>, AceError> {
        let provider = sqlx::query_as::<_, Provider>(
            "SELECT * FROM providers WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(provider)
    }

    /// List all providers
    pub async fn list(&self, active_only: bool) -> Result<Vec<Provider>, AceError> {
        let providers = sqlx::query_as::<_, Provider>(
            "SELECT * FROM providers WHERE ($1 = FALSE OR is_active = TRUE) ORDER BY provider_name ASC"
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(providers)
    }

    /// Update provider details
    pub async fn update(&self, id: i64, request: UpdateProviderRequest) -> Result<Provider, AceError> {
        let provider = sqlx::query_as::<_, Provider>(
            r#"
            UPDATE providers
            SET provider_name = COALESCE($2, provider_name),
                bacb_provider_number = COALESCE($3, bacb_provider_number),
                coordinator_certification_expires = COALESCE($4, coordinator_certification_expires),
                coordinator_certification_verified = COALESCE($5, coordinator_certification_verified),
                primary_email = COALESCE($6, primary_email),
                primary_phone = COALESCE($7, primary_phone),
                website = COALESCE($8, website),
                grace_period_end_date = COALESCE($9, grace_period_end_date),
                legal_entity_verified = COALESCE($10, legal_entity_verified),
                legal_entity_verified_at = CASE WHEN $10 = TRUE THEN $14 ELSE legal_entity_verified_at END,
                leadership_attestation_url = COALESCE($11, leadership_attestation_url),
                leadership_name = COALESCE($12, leadership_name),
                is_active = COALESCE($13, is_active),
                updated_at = $14
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(request.provider_name)
        .bind(request.bacb_provider_number)
        .bind(request.coordinator_certification_expires)
        .bind(request.coordinator_certification_verified)
        .bind(request.primary_email)
        .bind(request.primary_phone)
        .bind(request.website)
        .bind(request.grace_period_end_date)
        .bind(request.legal_entity_verified)
        .bind(request.leadership_attestation_url)
        .bind(request.leadership_name)
        .bind(request.is_active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        provider.ok_or_else(|| AceError::not_found("Provider", id))
    }

    /// Approve a provider for one year
    pub async fn approve(&self, id: i64, now: DateTime<Utc>) -> Result<Provider, AceError> {
        let provider = sqlx::query_as::<_, Provider>(
            r#"
            UPDATE providers
            SET is_active = TRUE,
                approval_date = $2,
                expiration_date = $3,
                can_publish_events = TRUE,
                can_issue_certificates = TRUE,
                updated_at = $2
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(now)
        .bind(now + Duration::days(365))
        .fetch_optional(&self.pool)
        .await?;

        provider.ok_or_else(|| AceError::not_found("Provider", id))
    }

    /// Record an application, renewal or late fee
    pub async fn record_payment(&self, id: i64, payment_type: PaymentType, amount: Option<f64>, now: DateTime<Utc>) -> Result<Provider, AceError> {
        let provider = match payment_type {
            PaymentType::Application => {
                sqlx::query_as::<_, Provider>(
                    r#"
                    UPDATE providers
                    SET application_fee_paid = TRUE, application_fee_amount = $2, application_fee_paid_date = $3, updated_at = $3
                    WHERE id = $1
                    RETURNING *
                    "#
                )
                .bind(id)
                .bind(amount)
                .bind(now)
                .fetch_optional(&self.pool)
                .await?
            }
            PaymentType::Renewal => {
                sqlx::query_as::<_, Provider>(
                    r#"
                    UPDATE providers
                    SET renewal_fee_paid = TRUE, last_renewal_date = $2, next_renewal_date = $3, updated_at = $2
                    WHERE id = $1
                    RETURNING *
                    "#
                )
                .bind(id)
                .bind(now)
                .bind(now + Duration::days(365))
                .fetch_optional(&self.pool)
                .await?
            }
            PaymentType::Late => {
                sqlx::query_as::<_, Provider>(
                    r#"
                    UPDATE providers
                    SET late_fee_paid = TRUE, late_fee_amount = $2, late_fee_paid_date = $3, updated_at = $3
                    WHERE id = $1
                    RETURNING *
                    "#
                )
                .bind(id)
                .bind(amount)
                .bind(now)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        provider.ok_or_else(|| AceError::not_found("Provider", id))
    }
}
