//! Data models for profiles, drinks and the consumption journal
//!
//! This module contains the structures persisted in the key-value store and
//! the static reference data types. Serialized field names follow the
//! storage layout the front end reads (`camelCase` for records and drinks).

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TeaCalError;

/// Preferred sweetness of a user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweetnessPreference {
    /// No sugar
    NoSugar,
    /// Low sweetness (0-30%)
    Low,
    /// Medium sweetness (30-70%)
    #[default]
    Medium,
    /// High sweetness (70-100%)
    High,
    /// Full sugar
    Full,
}

impl SweetnessPreference {
    /// Storage and CLI name of this preference
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoSugar => "no_sugar",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Full => "full",
        }
    }
}

impl FromStr for SweetnessPreference {
    type Err = TeaCalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "no_sugar" | "none" => Ok(Self::NoSugar),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "full" => Ok(Self::Full),
            other => Err(TeaCalError::Validation(format!(
                "Unknown sweetness preference: {other}"
            ))),
        }
    }
}

/// A registered user with credentials and biometric profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Unique user id
    pub id: String,
    /// Login name, unique across the store
    pub username: String,
    /// Argon2 PHC hash of the password
    pub credential: String,
    /// Body weight in kilograms
    #[serde(default)]
    pub weight: Option<f64>,
    /// Height in centimetres
    #[serde(default)]
    pub height: Option<f64>,
    /// Age in years
    #[serde(default)]
    pub age: Option<u32>,
    /// Preferred sweetness level
    #[serde(default)]
    pub sweetness_preference: SweetnessPreference,
    /// Favourite tea brands
    #[serde(default)]
    pub favorite_brands: BTreeSet<String>,
    /// When the account was registered
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// True once weight, height and age have been filled in
    #[must_use]
    pub const fn is_onboarded(&self) -> bool {
        self.weight.is_some() && self.height.is_some() && self.age.is_some()
    }
}

/// Fields the profile and onboarding forms may change
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    /// New weight in kilograms
    pub weight: Option<f64>,
    /// New height in centimetres
    pub height: Option<f64>,
    /// New age in years
    pub age: Option<u32>,
    /// New sweetness preference
    pub sweetness_preference: Option<SweetnessPreference>,
    /// Replacement set of favourite brands
    pub favorite_brands: Option<BTreeSet<String>>,
}

impl ProfileUpdate {
    /// Merge these fields into a stored profile
    pub fn apply_to(&self, profile: &mut UserProfile) {
        if let Some(weight) = self.weight {
            profile.weight = Some(weight);
        }
        if let Some(height) = self.height {
            profile.height = Some(height);
        }
        if let Some(age) = self.age {
            profile.age = Some(age);
        }
        if let Some(pref) = self.sweetness_preference {
            profile.sweetness_preference = pref;
        }
        if let Some(brands) = &self.favorite_brands {
            profile.favorite_brands.clone_from(brands);
        }
    }
}

/// Calorie tier of a drink or a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalorieCategory {
    /// Below 350 kcal
    Low,
    /// 350 to 499 kcal
    Medium,
    /// 500 kcal and above
    High,
}

impl CalorieCategory {
    /// Upper bound (exclusive) of the low tier
    pub const LOW_LIMIT_KCAL: f64 = 350.0;
    /// Upper bound (exclusive) of the medium tier
    pub const MEDIUM_LIMIT_KCAL: f64 = 500.0;

    /// Classify a calorie total
    #[must_use]
    pub fn from_kcal(kcal: f64) -> Self {
        if kcal < Self::LOW_LIMIT_KCAL {
            Self::Low
        } else if kcal < Self::MEDIUM_LIMIT_KCAL {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// All tiers, lowest first
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Low, Self::Medium, Self::High]
    }

    /// Lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// A drink from the static brand catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrinkProduct {
    /// Catalog id
    pub id: String,
    /// Drink name
    pub name: String,
    /// Brand selling it
    pub brand: String,
    /// Calories of a standard medium cup
    pub base_calories: f64,
    /// Standard serving description
    pub size: String,
    /// Standard sweetness description
    pub sugar_level: String,
    /// Ingredients included in the standard recipe
    pub ingredients: Vec<String>,
    /// Average user rating (0-5)
    pub rating: f32,
    /// Calorie tier
    pub category: CalorieCategory,
}

/// Serving volume tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CupSize {
    /// Small cup
    Small,
    /// Medium cup, the reference size of catalog calories
    #[default]
    Medium,
    /// Large cup
    Large,
}

impl CupSize {
    /// Lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl FromStr for CupSize {
    type Err = TeaCalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" | "s" => Ok(Self::Small),
            "medium" | "m" => Ok(Self::Medium),
            "large" | "l" => Ok(Self::Large),
            other => Err(TeaCalError::Validation(format!("Unknown cup size: {other}"))),
        }
    }
}

/// Mood logged with a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    /// Happy
    Happy,
    /// Relaxed
    Relaxed,
    /// Conflicted about the drink
    Conflicted,
    /// Celebrating something
    Celebrating,
}

impl Mood {
    /// Lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Relaxed => "relaxed",
            Self::Conflicted => "conflicted",
            Self::Celebrating => "celebrating",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = TeaCalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "happy" => Ok(Self::Happy),
            "relaxed" => Ok(Self::Relaxed),
            "conflicted" => Ok(Self::Conflicted),
            "celebrating" => Ok(Self::Celebrating),
            other => Err(TeaCalError::Validation(format!("Unknown mood: {other}"))),
        }
    }
}

/// The drink a record refers to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrinkRef {
    /// Drink name
    pub name: String,
    /// Brand name
    pub brand: String,
    /// Calories consumed
    pub calories: f64,
}

/// A logged instance of drink consumption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionRecord {
    /// Generated record id
    pub id: String,
    /// The drink consumed
    #[serde(rename = "drink")]
    pub drink_ref: DrinkRef,
    /// Cup size, if chosen
    #[serde(default)]
    pub cup_size: Option<CupSize>,
    /// Sugar percentage, if chosen
    #[serde(default)]
    pub sugar_level: Option<u8>,
    /// Mood at the time of drinking
    pub mood: Mood,
    /// Free-form notes
    #[serde(default)]
    pub notes: String,
    /// When the record was created
    pub timestamp: DateTime<Utc>,
}

impl ConsumptionRecord {
    /// Calorie tier of this record
    #[must_use]
    pub fn category(&self) -> CalorieCategory {
        CalorieCategory::from_kcal(self.drink_ref.calories)
    }
}

/// A journal entry before id and timestamp are assigned
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    /// The drink consumed
    pub drink: Option<DrinkRef>,
    /// Cup size, if chosen
    pub cup_size: Option<CupSize>,
    /// Sugar percentage, if chosen
    pub sugar_level: Option<u8>,
    /// Mood at the time of drinking
    pub mood: Mood,
    /// Free-form notes
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_thresholds() {
        assert_eq!(CalorieCategory::from_kcal(156.0), CalorieCategory::Low);
        assert_eq!(CalorieCategory::from_kcal(349.9), CalorieCategory::Low);
        assert_eq!(CalorieCategory::from_kcal(350.0), CalorieCategory::Medium);
        assert_eq!(CalorieCategory::from_kcal(499.0), CalorieCategory::Medium);
        assert_eq!(CalorieCategory::from_kcal(500.0), CalorieCategory::High);
    }

    #[test]
    fn test_sweetness_serializes_snake_case() {
        let json = serde_json::to_string(&SweetnessPreference::NoSugar).unwrap();
        assert_eq!(json, "\"no_sugar\"");
        assert_eq!(
            "no_sugar".parse::<SweetnessPreference>().unwrap(),
            SweetnessPreference::NoSugar
        );
    }

    #[test]
    fn test_record_uses_storage_field_names() {
        let record = ConsumptionRecord {
            id: "r1".to_string(),
            drink_ref: DrinkRef {
                name: "杨枝甘露".to_string(),
                brand: "茶百道".to_string(),
                calories: 156.0,
            },
            cup_size: Some(CupSize::Large),
            sugar_level: Some(30),
            mood: Mood::Happy,
            notes: String::new(),
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("drink").is_some());
        assert_eq!(value["cupSize"], "large");
        assert_eq!(value["sugarLevel"], 30);
    }

    #[test]
    fn test_profile_update_merges_only_given_fields() {
        let mut profile = UserProfile {
            id: "u1".to_string(),
            username: "alice".to_string(),
            credential: "hash".to_string(),
            weight: Some(55.0),
            height: None,
            age: None,
            sweetness_preference: SweetnessPreference::Medium,
            favorite_brands: BTreeSet::new(),
            created_at: Utc::now(),
        };
        let update = ProfileUpdate {
            height: Some(165.0),
            ..ProfileUpdate::default()
        };
        update.apply_to(&mut profile);
        assert_eq!(profile.weight, Some(55.0));
        assert_eq!(profile.height, Some(165.0));
        assert!(!profile.is_onboarded());
    }
}
