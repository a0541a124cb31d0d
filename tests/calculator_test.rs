//! Calculator scenarios and properties

use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use teacal::catalog::{self, IngredientTable};
use teacal::{CalorieCalculator, CalorieInput, CupSize};

const KNOWN: &[&str] = &["椰果", "珍珠", "布丁", "芋泥", "西米", "芝士奶盖"];

#[test]
fn test_yangzhi_ganlu_with_coconut_jelly() {
    let calculator = CalorieCalculator::default();
    let drink = catalog::find_drink("cbd-001").unwrap();
    assert_eq!(drink.base_calories, 156.0);

    let input = CalorieInput::for_drink(drink).with_ingredient("椰果", 50.0);
    let breakdown = calculator.calculate(&input);
    assert_eq!(breakdown.ingredients, 20.0);
    assert_eq!(breakdown.total, 176.0);
    assert_eq!(breakdown.display_kcal(), 176);
}

#[test]
fn test_zero_sugar_contributes_nothing_on_every_cup() {
    let calculator = CalorieCalculator::default();
    for size in [CupSize::Small, CupSize::Medium, CupSize::Large] {
        assert_eq!(calculator.sugar_adjustment(Some(0.0), Some(size)), 0.0);
        let input = CalorieInput::for_drink(catalog::find_drink("cbd-001").unwrap())
            .with_cup_size(size)
            .with_sugar_level(0.0);
        assert_eq!(calculator.calculate(&input).sugar, 0.0);
    }
}

#[test]
fn test_cup_size_scales_base() {
    let calculator = CalorieCalculator::default();
    assert_eq!(calculator.base_calories(Some(300.0), Some(CupSize::Small)), 240.0);
    assert_eq!(calculator.base_calories(Some(300.0), None), 300.0);
    assert_eq!(calculator.base_calories(Some(300.0), Some(CupSize::Large)), 375.0);
}

#[test]
fn test_full_sugar_per_cup() {
    let calculator = CalorieCalculator::default();
    assert_eq!(calculator.sugar_adjustment(Some(100.0), Some(CupSize::Small)), 80.0);
    assert_eq!(calculator.sugar_adjustment(Some(50.0), Some(CupSize::Medium)), 50.0);
    assert_eq!(calculator.sugar_adjustment(Some(150.0), Some(CupSize::Large)), 130.0);
    assert_eq!(calculator.sugar_adjustment(None, Some(CupSize::Large)), 0.0);
}

#[test]
fn test_injected_table_replaces_default() {
    let table = IngredientTable::from_entries("test", [("燕麦", 3.0)]).unwrap();
    let calculator = CalorieCalculator::new(Arc::new(table));
    let input = CalorieInput::default()
        .with_ingredient("燕麦", 10.0)
        .with_ingredient("椰果", 50.0);
    assert_eq!(calculator.total(&input), 30.0);
    assert_eq!(calculator.table().version(), "test");
}

#[test]
fn test_exercise_minutes() {
    let calculator = CalorieCalculator::default();
    assert_eq!(calculator.exercise_minutes(176.0), 18);
    assert_eq!(calculator.exercise_minutes(0.0), 0);
    let slower = CalorieCalculator::default().with_exercise_rate(8.0);
    assert_eq!(slower.exercise_minutes(176.0), 22);
}

fn unknown_name() -> impl Strategy<Value = String> {
    "[a-z]{3,12}".prop_map(|s| format!("unknown-{s}"))
}

proptest! {
    #[test]
    fn unknown_ingredients_contribute_zero(
        names in prop::collection::vec(unknown_name(), 1..6),
        grams in prop::collection::vec(0.0f64..1000.0, 6),
    ) {
        let calculator = CalorieCalculator::default();
        let ingredients: BTreeMap<String, f64> =
            names.into_iter().zip(grams).collect();
        prop_assert_eq!(calculator.ingredient_calories(&ingredients), 0.0);
    }

    #[test]
    fn total_is_monotonic_in_each_ingredient(
        index in 0..KNOWN.len(),
        base in 0.0f64..800.0,
        grams in 0.0f64..500.0,
        extra in 0.0f64..500.0,
        sugar in 0.0f64..=100.0,
    ) {
        let calculator = CalorieCalculator::default();
        let name = KNOWN[index];
        let input = |g: f64| CalorieInput {
            drink_calories: Some(base),
            ingredients: BTreeMap::from([(name.to_string(), g)]),
            cup_size: Some(CupSize::Medium),
            sugar_level: Some(sugar),
        };
        prop_assert!(calculator.total(&input(grams + extra)) >= calculator.total(&input(grams)));
    }

    #[test]
    fn identical_inputs_give_identical_output(
        base in prop::option::of(0.0f64..800.0),
        grams in 0.0f64..500.0,
        sugar in prop::option::of(0.0f64..=100.0),
    ) {
        let calculator = CalorieCalculator::default();
        let input = CalorieInput {
            drink_calories: base,
            ingredients: BTreeMap::from([("珍珠".to_string(), grams)]),
            cup_size: Some(CupSize::Large),
            sugar_level: sugar,
        };
        prop_assert_eq!(calculator.calculate(&input), calculator.calculate(&input));
    }
}
