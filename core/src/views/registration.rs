//! Victim registration form with ID-scan assist.

use crate::gateway::ExtractedIdentity;
use crate::model::{Victim, VictimStatus};
use crate::prelude::{GatewayResult, RegistrationError};
use crate::store::seed::{REGISTERING_OFFICER, REGISTRATION_DISASTER_ID};
use crate::telemetry::LogManager;
use crate::views::generation::{RequestGeneration, RequestTicket};
use chrono::{DateTime, Utc};

pub const OCR_FAILURE_ALERT: &str = "OCR Failed or API Key missing. Please enter manually.";
pub const UNKNOWN_ADDRESS: &str = "Unknown";

/// Raw form contents, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VictimForm {
    pub full_name: String,
    pub national_id: String,
    pub address: String,
    pub status: VictimStatus,
    pub notes: String,
    pub age: String,
    pub gender: String,
}

impl VictimForm {
    /// Copy of the form with every field the scan returned overwritten.
    pub fn merged(&self, extracted: &ExtractedIdentity) -> VictimForm {
        VictimForm {
            full_name: extracted
                .full_name
                .clone()
                .unwrap_or_else(|| self.full_name.clone()),
            national_id: extracted
                .national_id
                .clone()
                .unwrap_or_else(|| self.national_id.clone()),
            address: extracted
                .address
                .clone()
                .unwrap_or_else(|| self.address.clone()),
            ..self.clone()
        }
    }

    pub fn with_field(mut self, field: FormField, value: impl Into<String>) -> VictimForm {
        let value = value.into();
        match field {
            FormField::FullName => self.full_name = value,
            FormField::NationalId => self.national_id = value,
            FormField::Address => self.address = value,
            FormField::Notes => self.notes = value,
            FormField::Age => self.age = value,
            FormField::Gender => self.gender = value,
        }
        self
    }

    fn has_required_fields(&self) -> bool {
        !self.full_name.trim().is_empty() && !self.national_id.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    FullName,
    NationalId,
    Address,
    Notes,
    Age,
    Gender,
}

/// Result of feeding a scan response back into the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Applied,
    /// Form left untouched; the message is shown as a blocking alert.
    Failed(String),
    /// Response belonged to a superseded or cancelled scan.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Extracting(RequestTicket),
}

pub struct RegistrationForm {
    form: VictimForm,
    phase: Phase,
    generation: RequestGeneration,
    saved: Vec<Victim>,
    last_id_millis: i64,
    logger: LogManager,
}

impl RegistrationForm {
    pub fn new() -> Self {
        Self {
            form: VictimForm::default(),
            phase: Phase::Idle,
            generation: RequestGeneration::new(),
            saved: Vec::new(),
            last_id_millis: i64::MIN,
            logger: LogManager::new("registration"),
        }
    }

    pub fn form(&self) -> &VictimForm {
        &self.form
    }

    /// Most recent registration first.
    pub fn saved(&self) -> &[Victim] {
        &self.saved
    }

    pub fn is_extracting(&self) -> bool {
        matches!(self.phase, Phase::Extracting(_))
    }

    /// Manual edits are accepted in every phase.
    pub fn edit(&mut self, field: FormField, value: impl Into<String>) {
        self.form = std::mem::take(&mut self.form).with_field(field, value);
    }

    pub fn set_status(&mut self, status: VictimStatus) {
        self.form.status = status;
    }

    /// Starts an ID scan; refused while one is already running.
    pub fn begin_extraction(&mut self) -> Result<RequestTicket, RegistrationError> {
        if self.is_extracting() {
            return Err(RegistrationError::ExtractionInProgress);
        }
        let ticket = self.generation.issue();
        self.phase = Phase::Extracting(ticket);
        Ok(ticket)
    }

    pub fn finish_extraction(
        &mut self,
        ticket: RequestTicket,
        result: GatewayResult<ExtractedIdentity>,
    ) -> ExtractionOutcome {
        if !self.generation.settle(ticket) {
            self.logger.trace("discarding stale scan response");
            return ExtractionOutcome::Discarded;
        }
        self.phase = Phase::Idle;
        match result {
            Ok(extracted) => {
                self.form = self.form.merged(&extracted);
                self.logger.record("ID scan merged into form");
                ExtractionOutcome::Applied
            }
            Err(err) => {
                self.logger.warn(&format!("ID scan failed: {err}"));
                ExtractionOutcome::Failed(OCR_FAILURE_ALERT.to_string())
            }
        }
    }

    /// Abandons a running scan so its response is ignored.
    pub fn cancel_extraction(&mut self) {
        self.generation.invalidate();
        self.phase = Phase::Idle;
    }

    /// Registers the person in the form and clears it.
    pub fn save(&mut self, now: DateTime<Utc>) -> Result<&Victim, RegistrationError> {
        if !self.form.has_required_fields() {
            return Err(RegistrationError::MissingRequiredFields);
        }

        let form = std::mem::take(&mut self.form);
        let victim = Victim {
            id: self.next_id(now),
            full_name: form.full_name.trim().to_string(),
            national_id: form.national_id.trim().to_string(),
            address: non_blank(form.address).unwrap_or_else(|| UNKNOWN_ADDRESS.to_string()),
            age: form.age.trim().parse().ok(),
            gender: non_blank(form.gender),
            status: form.status,
            registered_at: now,
            registered_by: REGISTERING_OFFICER.to_string(),
            disaster_id: REGISTRATION_DISASTER_ID.to_string(),
            notes: non_blank(form.notes),
        };
        self.logger.record(&format!("registered {}", victim.id));
        self.saved.insert(0, victim);
        Ok(&self.saved[0])
    }

    /// `VIC-<millis>`, bumped when two saves share a millisecond.
    fn next_id(&mut self, now: DateTime<Utc>) -> String {
        let millis = now.timestamp_millis().max(self.last_id_millis.saturating_add(1));
        self.last_id_millis = millis;
        format!("VIC-{millis}")
    }
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self::new()
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::GatewayError;
    use chrono::TimeZone;

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    fn filled() -> RegistrationForm {
        let mut form = RegistrationForm::new();
        form.edit(FormField::FullName, "Jane Doe");
        form.edit(FormField::NationalId, "X123");
        form
    }

    #[test]
    fn save_prepends_record_and_resets_form() {
        let mut form = filled();
        form.edit(FormField::Notes, "needs insulin");
        let victim = form.save(at(1_700_000_000_000)).unwrap().clone();

        assert_eq!(victim.id, "VIC-1700000000000");
        assert_eq!(victim.full_name, "Jane Doe");
        assert_eq!(victim.status, VictimStatus::Safe);
        assert_eq!(victim.address, UNKNOWN_ADDRESS);
        assert_eq!(victim.registered_by, "OFFICER-101");
        assert_eq!(victim.disaster_id, "INC-2023-001");
        assert_eq!(victim.notes.as_deref(), Some("needs insulin"));
        assert_eq!(form.form(), &VictimForm::default());

        form.edit(FormField::FullName, "John Roe");
        form.edit(FormField::NationalId, "Y456");
        form.set_status(VictimStatus::Injured);
        form.save(at(1_700_000_000_500)).unwrap();

        let names: Vec<&str> = form.saved().iter().map(|v| v.full_name.as_str()).collect();
        assert_eq!(names, vec!["John Roe", "Jane Doe"]);
        assert_eq!(form.saved()[0].status, VictimStatus::Injured);
        assert_eq!(form.form().status, VictimStatus::Safe);
    }

    #[test]
    fn save_without_national_id_changes_nothing() {
        let mut form = RegistrationForm::new();
        form.edit(FormField::FullName, "Jane Doe");
        let before = form.form().clone();

        let err = form.save(at(0)).unwrap_err();
        assert_eq!(err, RegistrationError::MissingRequiredFields);
        assert_eq!(err.to_string(), "Name and ID are required");
        assert!(form.saved().is_empty());
        assert_eq!(form.form(), &before);
    }

    #[test]
    fn whitespace_name_is_rejected() {
        let mut form = RegistrationForm::new();
        form.edit(FormField::FullName, "   ");
        form.edit(FormField::NationalId, "X123");
        assert!(form.save(at(0)).is_err());
    }

    #[test]
    fn ids_stay_unique_within_one_millisecond() {
        let mut form = filled();
        form.save(at(42)).unwrap();
        form.edit(FormField::FullName, "B");
        form.edit(FormField::NationalId, "2");
        form.save(at(42)).unwrap();
        assert_eq!(form.saved()[0].id, "VIC-43");
        assert_eq!(form.saved()[1].id, "VIC-42");
    }

    #[test]
    fn optional_fields_are_parsed() {
        let mut form = filled();
        form.edit(FormField::Age, " 34 ");
        form.edit(FormField::Gender, "F");
        form.edit(FormField::Address, "12 Levee Rd");
        let victim = form.save(at(1)).unwrap();
        assert_eq!(victim.age, Some(34));
        assert_eq!(victim.gender.as_deref(), Some("F"));
        assert_eq!(victim.address, "12 Levee Rd");
    }

    #[test]
    fn unparseable_age_is_dropped() {
        let mut form = filled();
        form.edit(FormField::Age, "about forty");
        assert_eq!(form.save(at(1)).unwrap().age, None);
    }

    #[test]
    fn merge_overwrites_only_returned_fields() {
        let form = VictimForm {
            full_name: "typed".into(),
            address: "kept".into(),
            notes: "triage B".into(),
            status: VictimStatus::Missing,
            ..Default::default()
        };
        let extracted = ExtractedIdentity {
            full_name: Some("Jane Doe".into()),
            national_id: Some("X123".into()),
            address: None,
        };
        let merged = form.merged(&extracted);
        assert_eq!(merged.full_name, "Jane Doe");
        assert_eq!(merged.national_id, "X123");
        assert_eq!(merged.address, "kept");
        assert_eq!(merged.notes, "triage B");
        assert_eq!(merged.status, VictimStatus::Missing);
        assert_eq!(form.full_name, "typed");
    }

    #[test]
    fn scan_success_merges_and_returns_to_idle() {
        let mut form = RegistrationForm::new();
        form.edit(FormField::Notes, "arrived by boat");
        let ticket = form.begin_extraction().unwrap();
        assert!(form.is_extracting());

        let outcome = form.finish_extraction(
            ticket,
            Ok(ExtractedIdentity {
                full_name: Some("Jane Doe".into()),
                national_id: Some("X123".into()),
                address: Some(String::new()),
            }),
        );
        assert_eq!(outcome, ExtractionOutcome::Applied);
        assert!(!form.is_extracting());
        assert_eq!(form.form().full_name, "Jane Doe");
        assert_eq!(form.form().notes, "arrived by boat");
    }

    #[test]
    fn scan_failure_alerts_and_leaves_form() {
        let mut form = filled();
        let before = form.form().clone();
        let ticket = form.begin_extraction().unwrap();
        let outcome = form.finish_extraction(ticket, Err(GatewayError::MissingCredential));
        assert_eq!(outcome, ExtractionOutcome::Failed(OCR_FAILURE_ALERT.into()));
        assert!(!form.is_extracting());
        assert_eq!(form.form(), &before);
    }

    #[test]
    fn trigger_disabled_while_extracting() {
        let mut form = RegistrationForm::new();
        form.begin_extraction().unwrap();
        assert_eq!(
            form.begin_extraction(),
            Err(RegistrationError::ExtractionInProgress)
        );
    }

    #[test]
    fn edits_accepted_during_scan() {
        let mut form = RegistrationForm::new();
        let ticket = form.begin_extraction().unwrap();
        form.edit(FormField::Notes, "typed while scanning");
        form.finish_extraction(ticket, Ok(ExtractedIdentity::default()));
        assert_eq!(form.form().notes, "typed while scanning");
    }

    #[test]
    fn cancelled_scan_response_is_discarded() {
        let mut form = RegistrationForm::new();
        let ticket = form.begin_extraction().unwrap();
        form.cancel_extraction();
        let outcome = form.finish_extraction(
            ticket,
            Ok(ExtractedIdentity {
                full_name: Some("late".into()),
                ..Default::default()
            }),
        );
        assert_eq!(outcome, ExtractionOutcome::Discarded);
        assert_eq!(form.form().full_name, "");
        assert!(form.begin_extraction().is_ok());
    }
}
