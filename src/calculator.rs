//! Calorie calculation for a drink selection plus add-in ingredients.
//!
//! `total = base(drink, cup) + sugar(level, cup) + Σ per_gram(name) × grams`
//!
//! The calculator is pure: it holds only the injected ingredient table and
//! never touches storage. Totals stay fractional; round with
//! [`CalorieBreakdown::display_kcal`] when presenting them.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::{self, IngredientTable};
use crate::models::{CupSize, DrinkProduct};

/// kcal burned per minute of running, used for the exercise hint
pub const DEFAULT_KCAL_PER_EXERCISE_MINUTE: f64 = 10.0;

impl CupSize {
    /// Multiplier applied to a catalog (medium cup) base value
    #[must_use]
    pub const fn base_multiplier(&self) -> f64 {
        match self {
            Self::Small => 0.8,
            Self::Medium => 1.0,
            Self::Large => 1.25,
        }
    }

    /// Sugar calories of this cup at 100% sweetness
    #[must_use]
    pub const fn full_sugar_kcal(&self) -> f64 {
        match self {
            Self::Small => 80.0,
            Self::Medium => 100.0,
            Self::Large => 130.0,
        }
    }
}

/// Everything the calculator needs for one drink
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalorieInput {
    /// Base drink calories (medium cup); `None` when no drink is selected
    pub drink_calories: Option<f64>,
    /// Ingredient name to grams
    pub ingredients: BTreeMap<String, f64>,
    /// Cup size; catalog calories are for a medium cup
    pub cup_size: Option<CupSize>,
    /// Sweetness percentage, 0-100
    pub sugar_level: Option<f64>,
}

impl CalorieInput {
    /// Input for a catalog drink
    #[must_use]
    pub fn for_drink(drink: &DrinkProduct) -> Self {
        Self {
            drink_calories: Some(drink.base_calories),
            ..Self::default()
        }
    }

    /// Add grams of an ingredient, summing with any earlier amount
    #[must_use]
    pub fn with_ingredient(mut self, name: &str, grams: f64) -> Self {
        *self.ingredients.entry(name.to_string()).or_insert(0.0) += grams;
        self
    }

    /// Set the cup size
    #[must_use]
    pub fn with_cup_size(mut self, cup_size: CupSize) -> Self {
        self.cup_size = Some(cup_size);
        self
    }

    /// Set the sugar percentage
    #[must_use]
    pub fn with_sugar_level(mut self, sugar_level: f64) -> Self {
        self.sugar_level = Some(sugar_level);
        self
    }

    /// True when nothing has been selected yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drink_calories.is_none() && self.ingredients.is_empty()
    }
}

/// Per-part calorie result
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CalorieBreakdown {
    /// Drink base after the cup adjustment
    pub base: f64,
    /// Sugar contribution
    pub sugar: f64,
    /// Sum over ingredients
    pub ingredients: f64,
    /// `base + sugar + ingredients`
    pub total: f64,
}

impl CalorieBreakdown {
    /// Total rounded to whole kcal for display
    #[must_use]
    pub fn display_kcal(&self) -> i64 {
        self.total.round() as i64
    }
}

/// Pure calorie calculator over an injected ingredient table
#[derive(Debug, Clone)]
pub struct CalorieCalculator {
    table: Arc<IngredientTable>,
    kcal_per_exercise_minute: f64,
}

impl Default for CalorieCalculator {
    fn default() -> Self {
        Self::new(catalog::default_ingredient_table())
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

impl CalorieCalculator {
    /// Create a calculator over the given table
    #[must_use]
    pub const fn new(table: Arc<IngredientTable>) -> Self {
        Self {
            table,
            kcal_per_exercise_minute: DEFAULT_KCAL_PER_EXERCISE_MINUTE,
        }
    }

    /// Override the exercise conversion rate
    #[must_use]
    pub fn with_exercise_rate(mut self, kcal_per_minute: f64) -> Self {
        if kcal_per_minute.is_finite() && kcal_per_minute > 0.0 {
            self.kcal_per_exercise_minute = kcal_per_minute;
        }
        self
    }

    /// The injected ingredient table
    #[must_use]
    pub fn table(&self) -> &IngredientTable {
        &self.table
    }

    /// Base calories of the selected drink, scaled by cup size
    #[must_use]
    pub fn base_calories(&self, drink_calories: Option<f64>, cup_size: Option<CupSize>) -> f64 {
        let base = non_negative(drink_calories.unwrap_or(0.0));
        base * cup_size.unwrap_or_default().base_multiplier()
    }

    /// Sugar calories for a sweetness percentage; zero when no level is given
    #[must_use]
    pub fn sugar_adjustment(&self, sugar_level: Option<f64>, cup_size: Option<CupSize>) -> f64 {
        let Some(level) = sugar_level else {
            return 0.0;
        };
        let level = non_negative(level).min(100.0);
        cup_size.unwrap_or_default().full_sugar_kcal() * level / 100.0
    }

    /// Calories from add-in ingredients; unknown names contribute zero
    #[must_use]
    pub fn ingredient_calories(&self, ingredients: &BTreeMap<String, f64>) -> f64 {
        ingredients
            .iter()
            .map(|(name, grams)| self.table.lookup(name) * non_negative(*grams))
            .sum()
    }

    /// Compute the full breakdown
    #[must_use]
    pub fn calculate(&self, input: &CalorieInput) -> CalorieBreakdown {
        let base = self.base_calories(input.drink_calories, input.cup_size);
        let sugar = self.sugar_adjustment(input.sugar_level, input.cup_size);
        let ingredients = self.ingredient_calories(&input.ingredients);
        let breakdown = CalorieBreakdown {
            base,
            sugar,
            ingredients,
            total: base + sugar + ingredients,
        };
        tracing::trace!(
            base = breakdown.base,
            sugar = breakdown.sugar,
            ingredients = breakdown.ingredients,
            total = breakdown.total,
            table_version = self.table.version(),
            "Calories calculated"
        );
        breakdown
    }

    /// Total only
    #[must_use]
    pub fn total(&self, input: &CalorieInput) -> f64 {
        self.calculate(input).total
    }

    /// Minutes of running needed to burn `kcal`
    #[must_use]
    pub fn exercise_minutes(&self, kcal: f64) -> u32 {
        if kcal > 0.0 {
            (kcal / self.kcal_per_exercise_minute).round() as u32
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculator() -> CalorieCalculator {
        CalorieCalculator::default()
    }

    #[test]
    fn test_drink_plus_coconut_jelly() {
        let input = CalorieInput {
            drink_calories: Some(156.0),
            ..CalorieInput::default()
        }
        .with_ingredient("椰果", 50.0);
        let result = calculator().calculate(&input);
        assert!((result.total - 176.0).abs() < 1e-9);
        assert_eq!(result.display_kcal(), 176);
    }

    #[test]
    fn test_no_drink_contributes_zero_base() {
        let input = CalorieInput::default().with_ingredient("珍珠", 10.0);
        let result = calculator().calculate(&input);
        assert_eq!(result.base, 0.0);
        assert!((result.total - 23.4).abs() < 1e-9);
    }

    #[test]
    fn test_zero_sugar_on_every_cup() {
        let calc = calculator();
        for cup in [CupSize::Small, CupSize::Medium, CupSize::Large] {
            assert_eq!(calc.sugar_adjustment(Some(0.0), Some(cup)), 0.0);
        }
    }

    #[test]
    fn test_sugar_scales_with_cup_and_level() {
        let calc = calculator();
        assert_eq!(calc.sugar_adjustment(Some(100.0), Some(CupSize::Medium)), 100.0);
        assert_eq!(calc.sugar_adjustment(Some(50.0), Some(CupSize::Large)), 65.0);
        assert_eq!(calc.sugar_adjustment(Some(250.0), Some(CupSize::Small)), 80.0);
        assert_eq!(calc.sugar_adjustment(None, Some(CupSize::Large)), 0.0);
    }

    #[test]
    fn test_cup_size_scales_base() {
        let calc = calculator();
        assert_eq!(calc.base_calories(Some(200.0), Some(CupSize::Small)), 160.0);
        assert_eq!(calc.base_calories(Some(200.0), None), 200.0);
        assert_eq!(calc.base_calories(Some(200.0), Some(CupSize::Large)), 250.0);
    }

    #[test]
    fn test_negative_grams_are_clamped() {
        let input = CalorieInput::default()
            .with_ingredient("珍珠", -100.0)
            .with_ingredient("仙草", f64::NAN);
        assert_eq!(calculator().total(&input), 0.0);
    }

    #[test]
    fn test_exercise_minutes() {
        let calc = calculator();
        assert_eq!(calc.exercise_minutes(176.0), 18);
        assert_eq!(calc.exercise_minutes(0.0), 0);
        assert_eq!(calc.with_exercise_rate(5.0).exercise_minutes(100.0), 20);
    }
}
