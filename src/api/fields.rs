//! Listing form fields as they arrive over the wire.
//!
//! Multipart create requests carry every field as text, with the nested
//! fields (`location`, `facilities`, `amenities`, `ownerContact`) JSON-encoded
//! inside that text. Update requests arrive as a JSON object where the same
//! fields may be either encoded strings or already-structured values. Both
//! shapes are collected into [`RawFields`] and decoded into typed values here.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{Listing, Location, OwnerContact};

pub const REQUIRED_FIELDS: &[&str] = &[
    "title",
    "location",
    "locationString",
    "rent",
    "type",
    "description",
    "availableFrom",
    "ownerContact",
];

const DEFAULT_EVENTS: &str = "No";

#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("Missing required fields")]
    Missing(Vec<&'static str>),

    #[error("Invalid JSON format in fields")]
    InvalidJson { field: &'static str, reason: String },

    #[error("Invalid date format in fields")]
    InvalidDate { field: &'static str, value: String },
}

/// Untyped field bag collected from a multipart form or a JSON body
#[derive(Debug, Clone, Default)]
pub struct RawFields(Map<String, Value>);

impl RawFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Record a text part. A repeated name keeps the last value.
    pub fn insert_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), Value::String(value.into()));
    }

    /// A field counts as present unless it is absent, null or blank text.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self.0.get(name) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(v) => Some(v),
        }
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    fn text(&self, name: &str) -> Option<String> {
        self.get(name).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    fn missing_required(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|name| !self.is_present(name))
            .collect()
    }
}

/// Validated input for a new listing, before the server stamps identity and
/// image paths onto it.
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub location: Location,
    pub location_string: String,
    pub rent: f64,
    pub facilities: Vec<String>,
    pub amenities: Vec<String>,
    pub kind: String,
    pub available_from: DateTime<Utc>,
    pub events: String,
    pub lease_term: i64,
    pub owner_contact: OwnerContact,
}

impl NewListing {
    pub fn from_fields(fields: &RawFields) -> Result<Self, FieldError> {
        let missing = fields.missing_required();
        if !missing.is_empty() {
            return Err(FieldError::Missing(missing));
        }

        let location = decode_location(required(fields, "location")?)?;
        let owner_contact = decode_json("ownerContact", required(fields, "ownerContact")?)?;
        let facilities = optional_tags(fields, "facilities")?.unwrap_or_default();
        let amenities = optional_tags(fields, "amenities")?.unwrap_or_default();
        let available_from = parse_date("availableFrom", &required_text(fields, "availableFrom")?)?;

        Ok(Self {
            title: required_text(fields, "title")?,
            description: required_text(fields, "description")?,
            location,
            location_string: required_text(fields, "locationString")?,
            rent: fields.get("rent").and_then(coerce_number).unwrap_or(0.0),
            facilities,
            amenities,
            kind: required_text(fields, "type")?,
            available_from,
            events: fields.text("events").unwrap_or_else(|| DEFAULT_EVENTS.to_string()),
            lease_term: fields
                .get("leaseTerm")
                .and_then(coerce_number)
                .map(|n| n as i64)
                .unwrap_or(0),
            owner_contact,
        })
    }

    pub fn into_listing(self, owner_email: impl Into<String>, images: Vec<String>) -> Listing {
        let now = Utc::now();
        Listing {
            id: Uuid::new_v4(),
            title: self.title,
            description: self.description,
            location: self.location,
            location_string: self.location_string,
            rent: self.rent,
            facilities: self.facilities,
            amenities: self.amenities,
            kind: self.kind,
            available_from: self.available_from,
            events: self.events,
            lease_term: self.lease_term,
            owner_contact: self.owner_contact,
            images,
            owner_email: owner_email.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update. `None` keeps the stored value.
///
/// `_id`, `ownerEmail` and `images` are never patchable and are ignored if sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<Location>,
    pub location_string: Option<String>,
    pub rent: Option<f64>,
    pub facilities: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
    pub kind: Option<String>,
    pub available_from: Option<DateTime<Utc>>,
    pub events: Option<String>,
    pub lease_term: Option<i64>,
    pub owner_contact: Option<OwnerContact>,
}

impl ListingPatch {
    pub fn from_fields(fields: &RawFields) -> Result<Self, FieldError> {
        let location = fields.get("location").map(decode_location).transpose()?;
        let owner_contact = fields
            .get("ownerContact")
            .map(|v| decode_json("ownerContact", v))
            .transpose()?;
        let available_from = fields
            .text("availableFrom")
            .map(|s| parse_date("availableFrom", &s))
            .transpose()?;

        Ok(Self {
            title: fields.text("title"),
            description: fields.text("description"),
            location,
            location_string: fields.text("locationString"),
            rent: fields.get("rent").and_then(coerce_number),
            facilities: optional_tags(fields, "facilities")?,
            amenities: optional_tags(fields, "amenities")?,
            kind: fields.text("type"),
            available_from,
            events: fields.text("events"),
            lease_term: fields.get("leaseTerm").and_then(coerce_number).map(|n| n as i64),
            owner_contact,
        })
    }

    pub fn apply(self, listing: &mut Listing) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *slot = v;
            }
        }

        set(&mut listing.title, self.title);
        set(&mut listing.description, self.description);
        set(&mut listing.location, self.location);
        set(&mut listing.location_string, self.location_string);
        set(&mut listing.rent, self.rent);
        set(&mut listing.facilities, self.facilities);
        set(&mut listing.amenities, self.amenities);
        set(&mut listing.kind, self.kind);
        set(&mut listing.available_from, self.available_from);
        set(&mut listing.events, self.events);
        set(&mut listing.lease_term, self.lease_term);
        set(&mut listing.owner_contact, self.owner_contact);
        listing.updated_at = Utc::now();
    }
}

/// Lenient numeric coercion: numbers pass through, text is parsed, anything
/// else (or a non-finite result) yields `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn required<'a>(fields: &'a RawFields, name: &'static str) -> Result<&'a Value, FieldError> {
    fields.get(name).ok_or(FieldError::Missing(vec![name]))
}

fn required_text(fields: &RawFields, name: &'static str) -> Result<String, FieldError> {
    fields.text(name).ok_or(FieldError::Missing(vec![name]))
}

fn decode_json<T: DeserializeOwned>(field: &'static str, value: &Value) -> Result<T, FieldError> {
    let decoded = match value {
        Value::String(s) => serde_json::from_str(s),
        other => serde_json::from_value(other.clone()),
    };
    decoded.map_err(|e| FieldError::InvalidJson {
        field,
        reason: e.to_string(),
    })
}

/// Plain text that does not look like JSON is taken as a free-text location.
fn decode_location(value: &Value) -> Result<Location, FieldError> {
    if let Value::String(s) = value {
        let trimmed = s.trim_start();
        if !trimmed.starts_with(['{', '[', '"']) {
            return Ok(Location::Text(s.clone()));
        }
    }
    decode_json("location", value)
}

fn optional_tags(fields: &RawFields, name: &'static str) -> Result<Option<Vec<String>>, FieldError> {
    fields.get(name).map(|v| decode_json(name, v)).transpose()
}

fn parse_date(field: &'static str, value: &str) -> Result<DateTime<Utc>, FieldError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| FieldError::InvalidDate {
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::LatLng;
    use serde_json::json;

    fn complete_form() -> RawFields {
        let mut f = RawFields::new();
        f.insert_text("title", "Room A");
        f.insert_text("location", r#"{"lat":19.07,"lng":72.87}"#);
        f.insert_text("locationString", "Andheri, Mumbai");
        f.insert_text("rent", "5000");
        f.insert_text("facilities", r#"["WiFi","Food"]"#);
        f.insert_text("type", "Room");
        f.insert_text("description", "Near the station");
        f.insert_text("availableFrom", "2025-06-01");
        f.insert_text("amenities", r#"["AC"]"#);
        f.insert_text("ownerContact", r#"{"name":"Asha","phone":"98200","email":"asha@example.com"}"#);
        f
    }

    #[test]
    fn decodes_complete_multipart_form() {
        let new = NewListing::from_fields(&complete_form()).unwrap();
        assert_eq!(new.location, Location::Coordinates(LatLng { lat: 19.07, lng: 72.87 }));
        assert_eq!(new.rent, 5000.0);
        assert_eq!(new.facilities, vec!["WiFi", "Food"]);
        assert_eq!(new.events, "No");
        assert_eq!(new.lease_term, 0);
        assert_eq!(new.owner_contact.name, "Asha");
        assert_eq!(new.available_from.to_rfc3339(), "2025-06-01T00:00:00+00:00");
    }

    #[test]
    fn reports_every_missing_required_field() {
        let mut f = complete_form();
        f.insert_text("rent", "");
        f.0.remove("ownerContact");
        match NewListing::from_fields(&f) {
            Err(FieldError::Missing(names)) => assert_eq!(names, vec!["rent", "ownerContact"]),
            other => panic!("expected missing fields, got {:?}", other),
        }
    }

    #[test]
    fn non_numeric_rent_falls_back_to_zero() {
        let mut f = complete_form();
        f.insert_text("rent", "abc");
        f.insert_text("leaseTerm", "eleven");
        let new = NewListing::from_fields(&f).unwrap();
        assert_eq!(new.rent, 0.0);
        assert_eq!(new.lease_term, 0);
    }

    #[test]
    fn malformed_nested_json_is_rejected() {
        let mut f = complete_form();
        f.insert_text("facilities", "[WiFi");
        assert!(matches!(
            NewListing::from_fields(&f),
            Err(FieldError::InvalidJson { field: "facilities", .. })
        ));

        let mut f = complete_form();
        f.insert_text("ownerContact", r#"{"name":"Asha"}"#);
        assert!(matches!(
            NewListing::from_fields(&f),
            Err(FieldError::InvalidJson { field: "ownerContact", .. })
        ));
    }

    #[test]
    fn bare_text_location_is_free_text() {
        let mut f = complete_form();
        f.insert_text("location", "Chennai");
        let new = NewListing::from_fields(&f).unwrap();
        assert_eq!(new.location, Location::Text("Chennai".to_string()));
    }

    #[test]
    fn encoded_array_location_is_not_reshaped() {
        let mut f = complete_form();
        f.insert_text("location", "[12.9, 77.6]");
        let new = NewListing::from_fields(&f).unwrap();
        assert_eq!(new.location, Location::Details(json!([12.9, 77.6])));

        f.insert_text("location", "[1, 2, 3]");
        let new = NewListing::from_fields(&f).unwrap();
        assert_eq!(new.location, Location::Details(json!([1, 2, 3])));

        let fields = RawFields::from_map(json!({ "location": 42 }).as_object().cloned().unwrap());
        let patch = ListingPatch::from_fields(&fields).unwrap();
        assert_eq!(patch.location, Some(Location::Details(json!(42))));
    }

    #[test]
    fn rejects_unparseable_date() {
        let mut f = complete_form();
        f.insert_text("availableFrom", "next week");
        assert!(matches!(
            NewListing::from_fields(&f),
            Err(FieldError::InvalidDate { field: "availableFrom", .. })
        ));
    }

    #[test]
    fn patch_keeps_absent_and_unparseable_numbers() {
        let mut listing = NewListing::from_fields(&complete_form())
            .unwrap()
            .into_listing("asha@example.com", vec![]);

        let fields = RawFields::from_map(
            json!({ "rent": "n/a", "leaseTerm": 11, "title": "Room A+" })
                .as_object()
                .cloned()
                .unwrap(),
        );
        ListingPatch::from_fields(&fields).unwrap().apply(&mut listing);

        assert_eq!(listing.rent, 5000.0);
        assert_eq!(listing.lease_term, 11);
        assert_eq!(listing.title, "Room A+");
        assert_eq!(listing.facilities, vec!["WiFi", "Food"]);
    }

    #[test]
    fn patch_accepts_structured_json_values() {
        let fields = RawFields::from_map(
            json!({
                "location": {"lat": 1.5, "lng": 2.5},
                "amenities": ["Gym"],
                "ownerContact": {"name": "B", "phone": "2", "email": "b@example.com"}
            })
            .as_object()
            .cloned()
            .unwrap(),
        );
        let patch = ListingPatch::from_fields(&fields).unwrap();
        assert_eq!(patch.location, Some(Location::Coordinates(LatLng { lat: 1.5, lng: 2.5 })));
        assert_eq!(patch.amenities, Some(vec!["Gym".to_string()]));
        assert!(patch.rent.is_none());
    }

    #[test]
    fn patch_rejects_malformed_nested_json() {
        let mut fields = RawFields::new();
        fields.insert_text("amenities", "{not json");
        assert!(matches!(
            ListingPatch::from_fields(&fields),
            Err(FieldError::InvalidJson { field: "amenities", .. })
        ));
    }
}
