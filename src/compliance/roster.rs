//! Attendance roster for one event

use std::collections::{HashMap, HashSet};
use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::models::{AttendanceRecord, Event, EventStatus, Participant, Registration, VerificationMethod};

/// Share of the scheduled duration a participant must attend
pub const ATTENDANCE_THRESHOLD_PERCENT: i64 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterStatus {
    Present,
    Partial,
    CheckedIn,
    Absent,
}

#[derive(Debug, Clone, Serialize)]
pub struct RosterEntry {
    /// Attendance record id; absent rows have none
    pub id: Option<i64>,
    pub participant_id: i64,
    pub participant_name: String,
    pub participant_email: String,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub attendance_percentage: Option<i64>,
    pub status: RosterStatus,
    pub verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub verification_method: Option<VerificationMethod>,
    pub verification_code_entered: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RosterEvent {
    pub id: i64,
    pub title: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub verification_method: VerificationMethod,
    pub status: EventStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct RosterSummary {
    pub total_registered: usize,
    pub checked_in: usize,
    pub checked_out: usize,
    pub verified: usize,
    pub average_duration_minutes: i64,
    pub meets_threshold: usize,
    pub event_duration_minutes: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Roster {
    pub event: RosterEvent,
    pub attendance: Vec<RosterEntry>,
    pub summary: RosterSummary,
}

fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to.signed_duration_since(from).num_milliseconds() as f64 / 60_000.0).round() as i64
}

fn roster_entry(
    record: &AttendanceRecord,
    participant: Option<&Participant>,
    event_duration: Option<i64>,
    now: DateTime<Utc>,
) -> RosterEntry {
    let duration = record
        .sign_in_timestamp
        .map(|sign_in| minutes_between(sign_in, record.sign_out_timestamp.unwrap_or(now)));

    let percentage = match (duration, event_duration) {
        (Some(attended), Some(scheduled)) if scheduled > 0 => {
            Some(((attended as f64 / scheduled as f64) * 100.0).round().min(100.0) as i64)
        }
        _ => None,
    };

    let status = match (record.sign_in_timestamp, record.sign_out_timestamp) {
        (Some(_), Some(_)) if percentage.map_or(false, |p| p >= ATTENDANCE_THRESHOLD_PERCENT) => RosterStatus::Present,
        (Some(_), Some(_)) => RosterStatus::Partial,
        (Some(_), None) => RosterStatus::CheckedIn,
        _ => RosterStatus::Absent,
    };

    RosterEntry {
        id: Some(record.id),
        participant_id: record.participant_id,
        participant_name: participant.map_or_else(|| "Unknown".to_string(), Participant::full_name),
        participant_email: participant.map(|p| p.email.clone()).unwrap_or_default(),
        check_in_time: record.sign_in_timestamp,
        check_out_time: record.sign_out_timestamp,
        duration_minutes: duration,
        attendance_percentage: percentage,
        status,
        verified: record.verified,
        verified_at: record.verified_at,
        verification_method: Some(record.verification_method),
        verification_code_entered: record.verification_code_entered.clone(),
    }
}

/// Merge attendance records with confirmed registrations that never checked in
pub fn build_roster(
    event: &Event,
    records: &[AttendanceRecord],
    registrations: &[Registration],
    people: &HashMap<i64, Participant>,
    now: DateTime<Utc>,
) -> Roster {
    let event_duration = event.duration_minutes();

    let mut attendance: Vec<RosterEntry> = records
        .iter()
        .map(|record| roster_entry(record, people.get(&record.participant_id), event_duration, now))
        .collect();

    let attended: HashSet<i64> = records.iter().map(|r| r.participant_id).collect();
    let absent = registrations
        .iter()
        .filter(|r| r.is_confirmed() && !attended.contains(&r.participant_id))
        .map(|r| {
            let participant = people.get(&r.participant_id);
            RosterEntry {
                id: None,
                participant_id: r.participant_id,
                participant_name: participant.map_or_else(|| "Unknown".to_string(), Participant::full_name),
                participant_email: participant.map(|p| p.email.clone()).unwrap_or_default(),
                check_in_time: None,
                check_out_time: None,
                duration_minutes: None,
                attendance_percentage: None,
                status: RosterStatus::Absent,
                verified: false,
                verified_at: None,
                verification_method: None,
                verification_code_entered: None,
            }
        });
    attendance.extend(absent);

    let durations: Vec<i64> = attendance.iter().filter_map(|e| e.duration_minutes).collect();
    let average_duration_minutes = if durations.is_empty() {
        0
    } else {
        (durations.iter().sum::<i64>() as f64 / durations.len() as f64).round() as i64
    };

    let summary = RosterSummary {
        total_registered: registrations.len(),
        checked_in: attendance.iter().filter(|e| e.check_in_time.is_some()).count(),
        checked_out: attendance.iter().filter(|e| e.check_out_time.is_some()).count(),
        verified: attendance.iter().filter(|e| e.verified).count(),
        average_duration_minutes,
        meets_threshold: attendance
            .iter()
            .filter(|e| e.attendance_percentage.map_or(false, |p| p >= ATTENDANCE_THRESHOLD_PERCENT))
            .count(),
        event_duration_minutes: event_duration,
    };

    Roster {
        event: RosterEvent {
            id: event.id,
            title: event.title.clone(),
            start_date: event.start_date,
            end_date: event.end_date,
            duration_minutes: event_duration,
            verification_method: event.verification_method,
            status: event.status,
        },
        attendance,
        summary,
    }
}
