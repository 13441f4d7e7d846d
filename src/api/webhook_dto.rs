use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::domain::simulation::vehicle_event::{EventPayload, EventType, VehicleEvent};
use crate::domain::utils::id::LicensePlate;

/// Body of `POST /webhook`, in the snake_case layout the garage backend expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookEventDto {
    pub license_plate: LicensePlate,
    pub event_type: EventType,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_timestamp")]
    pub entry_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_timestamp")]
    pub exit_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

fn serialize_timestamp<S: Serializer>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(time) => serializer.serialize_str(&time.to_rfc3339_opts(SecondsFormat::Millis, true)),
        None => serializer.serialize_none(),
    }
}

impl From<&VehicleEvent> for WebhookEventDto {
    fn from(event: &VehicleEvent) -> Self {
        let mut dto = WebhookEventDto {
            license_plate: event.license_plate.clone(),
            event_type: event.event_type(),
            entry_time: None,
            exit_time: None,
            lat: None,
            lng: None,
        };

        match event.payload {
            EventPayload::Entry { entry_time } => dto.entry_time = Some(entry_time),
            EventPayload::Parked { lat, lng } => {
                dto.lat = Some(lat);
                dto.lng = Some(lng);
            }
            EventPayload::Exit { exit_time } => dto.exit_time = Some(exit_time),
        }

        dto
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::utils::id::SectorId;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_entry_payload() {
        let time = Utc.with_ymd_and_hms(2025, 1, 1, 10, 30, 0).unwrap();
        let event = VehicleEvent::entry(LicensePlate::new("SIM0001"), SectorId::new("A"), time);

        let value = serde_json::to_value(WebhookEventDto::from(&event)).unwrap();

        assert_eq!(value, json!({"license_plate": "SIM0001", "event_type": "ENTRY", "entry_time": "2025-01-01T10:30:00.000Z"}));
    }

    #[test]
    fn test_parked_payload_has_only_coordinates() {
        let event = VehicleEvent::parked(LicensePlate::new("SIM0002"), SectorId::new("C"), -23.5617, -46.656);

        let value = serde_json::to_value(WebhookEventDto::from(&event)).unwrap();

        assert_eq!(value, json!({"license_plate": "SIM0002", "event_type": "PARKED", "lat": -23.5617, "lng": -46.656}));
    }

    #[test]
    fn test_exit_payload() {
        let time = Utc.with_ymd_and_hms(2025, 1, 1, 12, 30, 0).unwrap();
        let event = VehicleEvent::exit(LicensePlate::new("SIM0003"), SectorId::new("D"), time);

        let value = serde_json::to_value(WebhookEventDto::from(&event)).unwrap();

        assert_eq!(value["event_type"], "EXIT");
        assert_eq!(value["exit_time"], "2025-01-01T12:30:00.000Z");
        assert!(value.get("entry_time").is_none());
        assert!(value.get("sector").is_none());
    }
}
