//! Compliance audit reports with findings and recommendations

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use super::audit::{
    AttendanceAudit, AuditCounts, AuditSummary, CertificateAudit, ComplaintAudit, DateRange, FeedbackAudit,
    ProviderOverview, QualificationAudit,
};
use super::score::{ComplianceLevel, ComplianceScore, Deduction};
use super::RESPONSE_WINDOW_DAYS;
use crate::models::text_enum;
use crate::utils::errors::{AceError, Result};
use crate::utils::helpers::round_one_decimal;

/// Instructor certifications expiring within this many days are reported
const EXPIRING_SOON_DAYS: i64 = 90;

text_enum! {
    ReportType, "report type" {
        Attendance => "attendance",
        Qualifications => "qualifications",
        Feedback => "feedback",
        Certificates => "certificates",
        Complaints => "complaints",
        FullAudit => "full_audit",
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportRequest {
    pub provider_id: Option<i64>,
    pub report_type: Option<String>,
    pub date_range_start: Option<DateTime<Utc>>,
    pub date_range_end: Option<DateTime<Utc>>,
}

impl ExportRequest {
    /// Check required fields and parse the report type
    pub fn validate(&self) -> Result<(i64, ReportType, DateRange)> {
        let provider_id = self
            .provider_id
            .ok_or_else(|| AceError::validation("Missing required field: provider_id"))?;

        let raw = self
            .report_type
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AceError::validation("Missing required field: report_type"))?;

        let report_type = raw.parse::<ReportType>().map_err(|_| {
            let valid: Vec<&str> = ReportType::ALL.iter().map(ReportType::as_str).collect();
            AceError::validation(format!("Invalid report_type. Must be one of: {}", valid.join(", ")))
        })?;

        let range = DateRange { start: self.date_range_start, end: self.date_range_end };
        Ok((provider_id, report_type, range))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreOverview {
    pub score: u32,
    pub level: ComplianceLevel,
    pub deductions: Vec<Deduction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceReportSummary {
    pub total_events: usize,
    pub total_attendance_records: usize,
    pub total_verified: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct QualificationReportSummary {
    pub total_instructors: usize,
    pub approved_instructors: usize,
    pub pending_approval: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackReportSummary {
    pub total_events: usize,
    pub total_feedback: usize,
    pub average_rating: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CertificateReportSummary {
    pub total_certificates: usize,
    pub issued_certificates: usize,
    pub pending_certificates: usize,
    pub total_ceus_issued: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplaintReportSummary {
    pub total_complaints: usize,
    pub resolved_complaints: usize,
    pub open_complaints: usize,
}

/// Report-specific data; serialized inline next to the common fields
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ReportBody {
    Attendance {
        attendance_data: Vec<AttendanceAudit>,
        summary: AttendanceReportSummary,
    },
    Qualifications {
        qualifications_data: Vec<QualificationAudit>,
        summary: QualificationReportSummary,
    },
    Feedback {
        feedback_data: Vec<FeedbackAudit>,
        summary: FeedbackReportSummary,
    },
    Certificates {
        certificate_data: Vec<CertificateAudit>,
        summary: CertificateReportSummary,
    },
    Complaints {
        complaint_data: Vec<ComplaintAudit>,
        summary: ComplaintReportSummary,
    },
    FullAudit {
        summary: AuditCounts,
        attendance_data: Vec<AttendanceAudit>,
        feedback_data: Vec<FeedbackAudit>,
        certificate_data: Vec<CertificateAudit>,
        qualifications_data: Vec<QualificationAudit>,
        complaint_data: Vec<ComplaintAudit>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReport {
    pub report_type: ReportType,
    pub provider: ProviderOverview,
    pub compliance_score: ScoreOverview,
    pub date_range: DateRange,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub body: ReportBody,
    pub findings: Vec<String>,
    pub recommendations: Vec<String>,
}

pub fn build_report(
    report_type: ReportType,
    audit: AuditSummary,
    score: &ComplianceScore,
    now: DateTime<Utc>,
) -> ComplianceReport {
    let AuditSummary {
        provider,
        summary,
        attendance_data,
        feedback_data,
        certificate_data,
        qualifications_data,
        complaint_data,
        generated_at,
        date_range,
    } = audit;

    let mut findings = Vec::new();
    let mut recommendations: Vec<&str> = Vec::new();

    let body = match report_type {
        ReportType::Attendance => {
            for event in &attendance_data {
                if event.total_attendance_records == 0 && event.total_registrations > 0 {
                    findings.push(format!(
                        "Event \"{}\" has {} registrations but no attendance records.",
                        event.event_title, event.total_registrations
                    ));
                }
                if event.total_attendance_records > 0 && event.verified_attendance < event.total_attendance_records {
                    findings.push(format!(
                        "Event \"{}\" has {} unverified attendance records.",
                        event.event_title,
                        event.total_attendance_records - event.verified_attendance
                    ));
                }
            }
            default_finding(&mut findings, "All attendance records are properly documented and verified.");
            recommendations.extend([
                "Ensure all attendance records are verified before issuing certificates.",
                "Implement timestamped sign-in/sign-out for all synchronous events.",
            ]);

            let summary = AttendanceReportSummary {
                total_events: attendance_data.len(),
                total_attendance_records: attendance_data.iter().map(|e| e.total_attendance_records).sum(),
                total_verified: attendance_data.iter().map(|e| e.verified_attendance).sum(),
            };
            ReportBody::Attendance { attendance_data, summary }
        }
        ReportType::Qualifications => {
            let pending_approval = summary.total_instructors.saturating_sub(summary.approved_instructors);
            if pending_approval > 0 {
                findings.push(format!("{} instructor(s) have pending qualification approval.", pending_approval));
            }
            for qualification in &qualifications_data {
                if qualification.expires_within(now, EXPIRING_SOON_DAYS) {
                    findings.push(format!(
                        "Instructor \"{}\" has a certification expiring soon.",
                        qualification.instructor_name
                    ));
                }
            }
            default_finding(&mut findings, "All instructor qualifications are current and approved.");
            recommendations.extend([
                "Review and approve all pending instructor qualifications promptly.",
                "Set up reminders for certification renewals.",
            ]);

            ReportBody::Qualifications {
                qualifications_data,
                summary: QualificationReportSummary {
                    total_instructors: summary.total_instructors,
                    approved_instructors: summary.approved_instructors,
                    pending_approval,
                },
            }
        }
        ReportType::Feedback => {
            for event in &feedback_data {
                if event.total_feedback == 0 {
                    findings.push(format!("Event \"{}\" has no feedback responses.", event.event_title));
                }
                if event.average_rating > 0.0 && event.average_rating < 3.0 {
                    findings.push(format!(
                        "Event \"{}\" has a low average rating of {}/5.",
                        event.event_title, event.average_rating
                    ));
                }
            }
            default_finding(&mut findings, "All events have adequate feedback with acceptable ratings.");
            recommendations.extend([
                "Review all feedback within 45 days of event completion per BACB requirements.",
                "Use feedback data to improve future event quality.",
            ]);

            let summary = FeedbackReportSummary {
                total_events: feedback_data.len(),
                total_feedback: feedback_data.iter().map(|e| e.total_feedback).sum(),
                average_rating: average_event_rating(&feedback_data),
            };
            ReportBody::Feedback { feedback_data, summary }
        }
        ReportType::Certificates => {
            for event in &certificate_data {
                if event.pending > 0 {
                    findings.push(format!(
                        "Event \"{}\" has {} pending certificate(s).",
                        event.event_title, event.pending
                    ));
                }
                if event.revoked > 0 {
                    findings.push(format!(
                        "Event \"{}\" has {} revoked certificate(s).",
                        event.event_title, event.revoked
                    ));
                }
            }
            default_finding(&mut findings, "All certificates are issued in a timely manner.");
            recommendations.extend([
                "Issue all certificates within 45 days of event completion per BACB requirements.",
                "Verify all eligibility requirements before issuing certificates.",
            ]);

            ReportBody::Certificates {
                certificate_data,
                summary: CertificateReportSummary {
                    total_certificates: summary.total_certificates,
                    issued_certificates: summary.issued_certificates,
                    pending_certificates: summary.total_certificates.saturating_sub(summary.issued_certificates),
                    total_ceus_issued: summary.total_ceus_issued,
                },
            }
        }
        ReportType::Complaints => {
            let open = summary.total_complaints.saturating_sub(summary.resolved_complaints);
            if open > 0 {
                findings.push(format!("{} complaint(s) are still open/unresolved.", open));
            }
            let overdue = complaint_data
                .iter()
                .filter(|c| !c.status.is_closed())
                .filter(|c| now > c.submitted_at + Duration::days(RESPONSE_WINDOW_DAYS))
                .count();
            if overdue > 0 {
                findings.push(format!("{} complaint(s) are past the 45-day response deadline.", overdue));
            }
            default_finding(&mut findings, "All complaints have been addressed in a timely manner.");
            recommendations.extend([
                "Respond to all complaints within 45 days per BACB requirements.",
                "Document all complaint resolutions thoroughly.",
            ]);

            ReportBody::Complaints {
                complaint_data,
                summary: ComplaintReportSummary {
                    total_complaints: summary.total_complaints,
                    resolved_complaints: summary.resolved_complaints,
                    open_complaints: open,
                },
            }
        }
        ReportType::FullAudit => {
            for deduction in &score.deductions {
                findings.push(format!(
                    "{}: -{} points x {} = -{} total",
                    deduction.reason,
                    deduction.points,
                    deduction.count,
                    deduction.total()
                ));
            }
            if score.score < 70 {
                recommendations.push(
                    "URGENT: Compliance score is below 70. Immediate action required to address all deduction items.",
                );
            } else if score.score < 85 {
                recommendations.push("Compliance score needs improvement. Review and address deduction items.");
            }
            recommendations.extend([
                "Maintain all records for a minimum of 3 years per BACB retention requirements.",
                "Ensure timely issuance of certificates within 45 days of event completion.",
                "Review and respond to all feedback and complaints within required timeframes.",
                "Keep all instructor qualifications current and properly documented.",
            ]);

            ReportBody::FullAudit {
                summary,
                attendance_data,
                feedback_data,
                certificate_data,
                qualifications_data,
                complaint_data,
            }
        }
    };

    ComplianceReport {
        report_type,
        provider,
        compliance_score: ScoreOverview {
            score: score.score,
            level: score.level,
            deductions: score.deductions.clone(),
        },
        date_range,
        generated_at,
        body,
        findings,
        recommendations: recommendations.into_iter().map(String::from).collect(),
    }
}

fn default_finding(findings: &mut Vec<String>, message: &str) {
    if findings.is_empty() {
        findings.push(message.to_string());
    }
}

/// Mean of the per-event averages over events that received feedback
fn average_event_rating(events: &[FeedbackAudit]) -> f64 {
    let rated: Vec<f64> = events
        .iter()
        .filter(|e| e.total_feedback > 0)
        .map(|e| e.average_rating)
        .collect();
    if rated.is_empty() {
        return 0.0;
    }
    round_one_decimal(rated.iter().sum::<f64>() / rated.len() as f64)
}
