//! Check-in payload and session record

use alerting::AlertSubject;
use serde::{Deserialize, Serialize};
use timing::Timestamp;

use crate::SessionError;

/// Payload supplied by the check-in intake
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckIn {
    pub name: String,
    pub vehicle_id: String,
    pub shift_start: String,
    pub last_break: String,
}

impl CheckIn {
    /// Only name and vehicle id are checked here; the intake validates
    /// everything else
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.name.trim().is_empty() {
            return Err(SessionError::MissingField("name"));
        }
        if self.vehicle_id.trim().is_empty() {
            return Err(SessionError::MissingField("vehicle_id"));
        }
        Ok(())
    }
}

/// Live session record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverSession {
    pub driver_name: String,
    pub vehicle_id: String,
    pub shift_start: String,
    pub last_break: String,
    pub checked_in_at: Timestamp,
    pub is_monitoring: bool,
    pub alert_count: u32,
    pub last_alert_at: Option<Timestamp>,
}

impl DriverSession {
    pub(crate) fn from_check_in(check_in: CheckIn, checked_in_at: Timestamp) -> Self {
        Self {
            driver_name: check_in.name,
            vehicle_id: check_in.vehicle_id,
            shift_start: check_in.shift_start,
            last_break: check_in.last_break,
            checked_in_at,
            is_monitoring: false,
            alert_count: 0,
            last_alert_at: None,
        }
    }
}

impl AlertSubject for DriverSession {
    fn driver_name(&self) -> &str {
        &self.driver_name
    }

    fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_in_validation() {
        let mut check_in = CheckIn {
            name: "Maria Garcia".into(),
            vehicle_id: "TR-007".into(),
            ..Default::default()
        };
        assert!(check_in.validate().is_ok());

        check_in.vehicle_id = " ".into();
        assert_eq!(check_in.validate(), Err(SessionError::MissingField("vehicle_id")));

        check_in.name.clear();
        assert_eq!(check_in.validate(), Err(SessionError::MissingField("name")));
    }
}
