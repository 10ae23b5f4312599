use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Map pin dropped by the listing form
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Listing location as submitted by the various form paths.
///
/// Only an object holding exactly `lat` and `lng` numbers is a pin. Every
/// other JSON value is kept as sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Location {
    Coordinates(LatLng),
    Text(String),
    Details(Value),
}

impl From<Value> for Location {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Location::Text(s),
            Value::Object(_) => match serde_json::from_value::<LatLng>(value.clone()) {
                Ok(pin) => Location::Coordinates(pin),
                Err(_) => Location::Details(value),
            },
            other => Location::Details(other),
        }
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Location::from)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerContact {
    pub name: String,
    pub phone: String,
    pub email: String,
}

/// A rentable-property document owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: Location,
    pub location_string: String,
    pub rent: f64,
    #[serde(default)]
    pub facilities: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub available_from: DateTime<Utc>,
    pub events: String,
    pub lease_term: i64,
    pub owner_contact: OwnerContact,
    #[serde(default)]
    pub images: Vec<String>,
    pub owner_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    pub fn is_owned_by(&self, email: &str) -> bool {
        self.owner_email == email
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn location_decodes_each_shape() {
        let pin: Location = serde_json::from_value(json!({"lat": 13.08, "lng": 80.27})).unwrap();
        assert_eq!(pin, Location::Coordinates(LatLng { lat: 13.08, lng: 80.27 }));

        let text: Location = serde_json::from_value(json!("Chennai")).unwrap();
        assert_eq!(text, Location::Text("Chennai".to_string()));

        let details: Location =
            serde_json::from_value(json!({"lat": 1.0, "lng": 2.0, "city": "Pune"})).unwrap();
        assert!(matches!(details, Location::Details(ref m) if m["city"] == "Pune"));
    }

    #[test]
    fn non_object_values_are_kept_as_sent() {
        for raw in [json!([12.9, 77.6]), json!([1, 2, 3]), json!(42), json!(null)] {
            let location: Location = serde_json::from_value(raw.clone()).unwrap();
            assert_eq!(location, Location::Details(raw.clone()));
            assert_eq!(serde_json::to_value(&location).unwrap(), raw);
        }

        let partial: Location = serde_json::from_value(json!({"lat": 1.0})).unwrap();
        assert_eq!(partial, Location::Details(json!({"lat": 1.0})));
    }

    #[test]
    fn listing_serializes_with_wire_names() {
        let now = Utc::now();
        let listing = Listing {
            id: Uuid::new_v4(),
            title: "Room A".to_string(),
            description: "Sunny".to_string(),
            location: Location::Text("Delhi".to_string()),
            location_string: "Delhi".to_string(),
            rent: 5000.0,
            facilities: vec!["WiFi".to_string()],
            amenities: vec![],
            kind: "Room".to_string(),
            available_from: now,
            events: "No".to_string(),
            lease_term: 0,
            owner_contact: OwnerContact {
                name: "O".to_string(),
                phone: "1".to_string(),
                email: "o@example.com".to_string(),
            },
            images: vec![],
            owner_email: "o@example.com".to_string(),
            created_at: now,
            updated_at: now,
        };

        let v = serde_json::to_value(&listing).unwrap();
        assert!(v.get("_id").is_some());
        assert_eq!(v["type"], "Room");
        assert_eq!(v["locationString"], "Delhi");
        assert_eq!(v["ownerEmail"], "o@example.com");
        assert_eq!(v["ownerContact"]["phone"], "1");
    }
}
