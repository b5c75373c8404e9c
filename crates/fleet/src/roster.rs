//! Fleet roster

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use timing::Timestamp;
use tracing::info;

use crate::FleetError;

/// Driver risk status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverStatus {
    #[default]
    Safe,
    Warning,
    Danger,
}

impl DriverStatus {
    /// All statuses, in escalation order
    pub const ALL: [DriverStatus; 3] = [DriverStatus::Safe, DriverStatus::Warning, DriverStatus::Danger];

    pub fn as_str(&self) -> &'static str {
        match self {
            DriverStatus::Safe => "safe",
            DriverStatus::Warning => "warning",
            DriverStatus::Danger => "danger",
        }
    }
}

/// Roster entry as supplied at registration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverRegistration {
    pub id: String,
    pub name: String,
    pub vehicle_id: String,
    pub location: String,
    pub shift_start: String,
    pub status: DriverStatus,
    pub last_alert_at: Option<Timestamp>,
    pub alert_count: u32,
}

/// Validated roster record. Only the fleet engine mutates it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetDriverRecord {
    id: String,
    name: String,
    vehicle_id: String,
    location: String,
    shift_start: String,
    pub(crate) status: DriverStatus,
    pub(crate) last_alert_at: Option<Timestamp>,
    pub(crate) alert_count: u32,
}

impl FleetDriverRecord {
    fn from_registration(index: usize, reg: DriverRegistration) -> Result<Self, FleetError> {
        let required = [("id", &reg.id), ("name", &reg.name), ("vehicle_id", &reg.vehicle_id)];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(FleetError::MissingField { index, field });
            }
        }

        Ok(Self {
            id: reg.id,
            name: reg.name,
            vehicle_id: reg.vehicle_id,
            location: reg.location,
            shift_start: reg.shift_start,
            status: reg.status,
            last_alert_at: reg.last_alert_at,
            alert_count: reg.alert_count,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn shift_start(&self) -> &str {
        &self.shift_start
    }

    pub fn status(&self) -> DriverStatus {
        self.status
    }

    pub fn last_alert_at(&self) -> Option<Timestamp> {
        self.last_alert_at
    }

    pub fn alert_count(&self) -> u32 {
        self.alert_count
    }
}

/// Control-room overview counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FleetSummary {
    pub total: usize,
    pub safe: usize,
    pub warning: usize,
    pub danger: usize,
}

impl FleetSummary {
    /// Drivers currently in critical status
    pub fn critical_alerts(&self) -> usize {
        self.danger
    }
}

/// Fixed-membership roster of fleet drivers
#[derive(Debug, Clone, Default, Serialize)]
pub struct FleetRoster {
    records: Vec<FleetDriverRecord>,
}

impl FleetRoster {
    /// Validate registrations into a roster
    pub fn new(registrations: Vec<DriverRegistration>) -> Result<Self, FleetError> {
        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(registrations.len());

        for (index, reg) in registrations.into_iter().enumerate() {
            let record = FleetDriverRecord::from_registration(index, reg)?;
            if !seen.insert(record.id.clone()) {
                return Err(FleetError::DuplicateId(record.id));
            }
            records.push(record);
        }

        info!("Fleet roster created with {} drivers", records.len());
        Ok(Self { records })
    }

    /// Roster the control room starts with when nothing is configured
    pub fn demo_registrations(now: Timestamp) -> Vec<DriverRegistration> {
        let minutes_ago = |m: i64| Some(now - chrono::Duration::minutes(m));
        vec![
            DriverRegistration {
                id: "1".into(),
                name: "John Smith".into(),
                vehicle_id: "TR-001".into(),
                location: "Highway I-95 North".into(),
                shift_start: "06:00".into(),
                status: DriverStatus::Safe,
                last_alert_at: None,
                alert_count: 0,
            },
            DriverRegistration {
                id: "2".into(),
                name: "Maria Garcia".into(),
                vehicle_id: "TR-007".into(),
                location: "Route 66 West".into(),
                shift_start: "05:30".into(),
                status: DriverStatus::Warning,
                last_alert_at: minutes_ago(30),
                alert_count: 2,
            },
            DriverRegistration {
                id: "3".into(),
                name: "David Johnson".into(),
                vehicle_id: "TR-015".into(),
                location: "Interstate 10 East".into(),
                shift_start: "04:00".into(),
                status: DriverStatus::Danger,
                last_alert_at: minutes_ago(2),
                alert_count: 5,
            },
            DriverRegistration {
                id: "4".into(),
                name: "Sarah Chen".into(),
                vehicle_id: "TR-023".into(),
                location: "Highway 101 South".into(),
                shift_start: "07:00".into(),
                status: DriverStatus::Safe,
                last_alert_at: None,
                alert_count: 1,
            },
        ]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FleetDriverRecord> {
        self.records.iter()
    }

    pub(crate) fn records_mut(&mut self) -> impl Iterator<Item = &mut FleetDriverRecord> {
        self.records.iter_mut()
    }

    /// Look up a driver by id
    pub fn get(&self, driver_id: &str) -> Option<&FleetDriverRecord> {
        self.records.iter().find(|r| r.id == driver_id)
    }

    /// Status counters for the overview
    pub fn summary(&self) -> FleetSummary {
        self.records.iter().fold(
            FleetSummary {
                total: self.records.len(),
                ..Default::default()
            },
            |mut summary, record| {
                match record.status {
                    DriverStatus::Safe => summary.safe += 1,
                    DriverStatus::Warning => summary.warning += 1,
                    DriverStatus::Danger => summary.danger += 1,
                }
                summary
            },
        )
    }

    /// Resolve a driver the operator wants to contact
    pub fn contact(&self, driver_id: &str) -> Option<&FleetDriverRecord> {
        let record = self.get(driver_id)?;
        info!("Connecting to {} ({})...", record.name, record.vehicle_id);
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(id: &str, name: &str, vehicle: &str) -> DriverRegistration {
        DriverRegistration {
            id: id.into(),
            name: name.into(),
            vehicle_id: vehicle.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_demo_roster_summary() {
        let roster = FleetRoster::new(FleetRoster::demo_registrations(chrono::Utc::now())).unwrap();
        let summary = roster.summary();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.safe, 2);
        assert_eq!(summary.warning, 1);
        assert_eq!(summary.danger, 1);
        assert_eq!(summary.critical_alerts(), 1);
    }

    #[test]
    fn test_missing_field_rejected() {
        let result = FleetRoster::new(vec![
            registration("1", "John Smith", "TR-001"),
            registration("2", "  ", "TR-007"),
        ]);
        assert_eq!(result.unwrap_err(), FleetError::MissingField { index: 1, field: "name" });

        let result = FleetRoster::new(vec![registration("1", "John Smith", "")]);
        assert!(matches!(result, Err(FleetError::MissingField { field: "vehicle_id", .. })));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = FleetRoster::new(vec![
            registration("1", "John Smith", "TR-001"),
            registration("1", "Maria Garcia", "TR-007"),
        ]);
        assert_eq!(result.unwrap_err(), FleetError::DuplicateId("1".into()));
    }

    #[test]
    fn test_empty_roster_is_valid() {
        let roster = FleetRoster::new(Vec::new()).unwrap();
        assert!(roster.is_empty());
        assert_eq!(roster.summary(), FleetSummary::default());
    }

    #[test]
    fn test_contact() {
        let roster = FleetRoster::new(vec![registration("7", "Sarah Chen", "TR-023")]).unwrap();
        assert_eq!(roster.contact("7").map(|r| r.name()), Some("Sarah Chen"));
        assert!(roster.contact("unknown").is_none());
    }
}
