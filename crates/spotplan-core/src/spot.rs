//! Spot domain model: the wire input, the validated draft, and the stored record.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Error, Result};

/// Fixed taxonomy of spot categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum SpotCategory {
    Heritage,
    Religious,
    Adventure,
    Nature,
    Cultural,
    Food,
    Shopping,
    Entertainment,
}

impl SpotCategory {
    pub const ALL: [SpotCategory; 8] = [
        SpotCategory::Heritage,
        SpotCategory::Religious,
        SpotCategory::Adventure,
        SpotCategory::Nature,
        SpotCategory::Cultural,
        SpotCategory::Food,
        SpotCategory::Shopping,
        SpotCategory::Entertainment,
    ];

    /// Display name, as sent by the form (`"Heritage"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            SpotCategory::Heritage => "Heritage",
            SpotCategory::Religious => "Religious",
            SpotCategory::Adventure => "Adventure",
            SpotCategory::Nature => "Nature",
            SpotCategory::Cultural => "Cultural",
            SpotCategory::Food => "Food",
            SpotCategory::Shopping => "Shopping",
            SpotCategory::Entertainment => "Entertainment",
        }
    }
}

impl fmt::Display for SpotCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpotCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::Validation(format!("unknown spot type: {:?}", s)))
    }
}

impl TryFrom<String> for SpotCategory {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Geographic position of a spot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Location {
    #[serde(alias = "lat")]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[serde(alias = "lng")]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

/// Request body as submitted by a client. Every field is optional here so
/// that missing fields surface as validation errors rather than parse errors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotInput {
    pub name: Option<String>,
    pub city: Option<String>,
    #[serde(rename = "type")]
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "recommendedTime")]
    pub recommended_time_hours: Option<f64>,
    pub target_audience: Option<Vec<String>>,
    pub email: Option<String>,
    pub start_time: Option<String>,
    pub location: Option<Location>,
    pub tags: Option<Vec<String>>,
    pub open_hours: Option<String>,
    pub entry_fee: Option<f64>,
}

/// Every mutable field of a spot, already validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SpotDraft {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[serde(rename = "type")]
    pub category: SpotCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[validate(range(min = 0.5))]
    pub recommended_time_hours: f64,
    #[serde(default)]
    pub target_audience: Vec<String>,
    #[validate(email)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub location: Option<Location>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_hours: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub entry_fee: Option<f64>,
}

impl SpotDraft {
    /// Parse a raw JSON request body into a validated draft.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::Validation("spot must be a JSON object".into()));
        }
        let input: SpotInput = serde_json::from_value(value.clone())
            .map_err(|e| Error::Validation(e.to_string()))?;
        Self::from_input(input)
    }

    /// Convert the lenient wire shape, reporting every missing required field at once.
    pub fn from_input(input: SpotInput) -> Result<Self> {
        let mut missing = Vec::new();
        if input.name.is_none() {
            missing.push("name");
        }
        if input.city.is_none() {
            missing.push("city");
        }
        if input.category.is_none() {
            missing.push("type");
        }
        if input.recommended_time_hours.is_none() {
            missing.push("recommendedTimeHours");
        }
        if input.email.is_none() {
            missing.push("email");
        }
        if !missing.is_empty() {
            return Err(Error::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        let category: SpotCategory = input.category.unwrap_or_default().parse()?;
        let draft = SpotDraft {
            name: input.name.unwrap_or_default(),
            city: input.city.unwrap_or_default(),
            category,
            description: input.description,
            recommended_time_hours: input.recommended_time_hours.unwrap_or_default(),
            target_audience: input.target_audience.unwrap_or_default(),
            email: input.email.unwrap_or_default(),
            // The form posts "" for an untouched time picker.
            start_time: input.start_time.filter(|t| !t.trim().is_empty()),
            location: input.location,
            tags: input.tags.unwrap_or_default(),
            open_hours: input.open_hours,
            entry_fee: input.entry_fee,
        };
        draft.check()?;
        Ok(draft)
    }

    /// Enforce every data-model constraint.
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        if self.name.trim().is_empty() {
            return Err(Error::Validation("name must not be blank".into()));
        }
        if self.city.trim().is_empty() {
            return Err(Error::Validation("city must not be blank".into()));
        }
        if !is_half_hour_step(self.recommended_time_hours) {
            return Err(Error::Validation(format!(
                "recommendedTimeHours must be a positive multiple of 0.5, got {}",
                self.recommended_time_hours
            )));
        }
        if let Some(start) = &self.start_time {
            if !is_clock_time(start) {
                return Err(Error::Validation(format!(
                    "startTime must be HH:MM, got {:?}",
                    start
                )));
            }
        }
        Ok(())
    }
}

fn is_half_hour_step(hours: f64) -> bool {
    hours.is_finite() && hours >= 0.5 && (hours * 2.0).fract() == 0.0
}

fn is_clock_time(value: &str) -> bool {
    value.len() == 5 && NaiveTime::parse_from_str(value, "%H:%M").is_ok()
}

/// A persisted spot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spot {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: SpotDraft,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}
