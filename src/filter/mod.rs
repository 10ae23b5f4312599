//! Public listing search: substring and equality filters only.

use serde::Deserialize;

use crate::database::models::Listing;

/// Query parameters accepted by the search endpoint. Blank values are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingFilter {
    /// Case-insensitive substring of `locationString`
    pub location: Option<String>,
    /// Maximum rent, inclusive. Unparseable values are ignored.
    pub rent: Option<String>,
    /// Tag that must appear in `facilities` or `amenities`
    pub facility: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Bind value produced alongside a generated WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub enum FilterParam {
    Text(String),
    Number(f64),
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ListingFilter {
    pub fn location(&self) -> Option<&str> {
        non_blank(&self.location)
    }

    pub fn max_rent(&self) -> Option<f64> {
        non_blank(&self.rent)
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|n| n.is_finite())
    }

    pub fn facility(&self) -> Option<&str> {
        non_blank(&self.facility)
    }

    pub fn kind(&self) -> Option<&str> {
        non_blank(&self.kind)
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(needle) = self.location() {
            if !listing
                .location_string
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        if let Some(max) = self.max_rent() {
            if listing.rent > max {
                return false;
            }
        }
        if let Some(tag) = self.facility() {
            let tag = tag.to_lowercase();
            let found = listing
                .facilities
                .iter()
                .chain(listing.amenities.iter())
                .any(|t| t.to_lowercase() == tag);
            if !found {
                return false;
            }
        }
        if let Some(kind) = self.kind() {
            if listing.kind.to_lowercase() != kind.to_lowercase() {
                return false;
            }
        }
        true
    }

    /// Build a WHERE clause over the `listings.document` jsonb column.
    /// Placeholders are numbered from `starting_param_index + 1`.
    pub fn where_clause(&self, starting_param_index: usize) -> (String, Vec<FilterParam>) {
        let mut conditions = vec![];
        let mut params = vec![];
        let next = |params: &mut Vec<FilterParam>, p: FilterParam| {
            params.push(p);
            starting_param_index + params.len()
        };

        if let Some(needle) = self.location() {
            let idx = next(&mut params, FilterParam::Text(format!("%{}%", escape_like(needle))));
            conditions.push(format!("document->>'locationString' ILIKE ${} ESCAPE '\\'", idx));
        }
        if let Some(max) = self.max_rent() {
            let idx = next(&mut params, FilterParam::Number(max));
            conditions.push(format!("(document->>'rent')::float8 <= ${}", idx));
        }
        if let Some(tag) = self.facility() {
            let idx = next(&mut params, FilterParam::Text(tag.to_string()));
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM jsonb_array_elements_text(\
                 COALESCE(document->'facilities', '[]'::jsonb) || COALESCE(document->'amenities', '[]'::jsonb)\
                 ) AS tag WHERE lower(tag) = lower(${}))",
                idx
            ));
        }
        if let Some(kind) = self.kind() {
            let idx = next(&mut params, FilterParam::Text(kind.to_string()));
            conditions.push(format!("lower(document->>'type') = lower(${})", idx));
        }

        let clause = if conditions.is_empty() {
            "1=1".to_string()
        } else {
            conditions.join(" AND ")
        };
        (clause, params)
    }
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
