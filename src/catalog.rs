//! Static reference data: ingredient calories, drinks, brands and tips.
//!
//! The ingredient table is the single source of per-gram calorie values. It
//! carries a version string so stored calculations can be traced back to
//! the table that produced them.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;

use crate::error::{Result, TeaCalError};
use crate::models::{CalorieCategory, DrinkProduct};

/// Version of the bundled ingredient table
pub const INGREDIENT_TABLE_VERSION: &str = "2024.1";

/// Versioned mapping from ingredient name to kcal per gram
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientTable {
    version: String,
    per_gram: HashMap<String, f64>,
}

impl IngredientTable {
    /// Create an empty table
    #[must_use]
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            per_gram: HashMap::new(),
        }
    }

    /// Build a table from `(name, kcal_per_gram)` pairs
    pub fn from_entries<'a, I>(version: &str, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut table = Self::new(version);
        for (name, kcal) in entries {
            table.insert(name, kcal)?;
        }
        Ok(table)
    }

    /// Add or replace an ingredient. Values must be finite and non-negative.
    pub fn insert(&mut self, name: &str, kcal_per_gram: f64) -> Result<()> {
        if !kcal_per_gram.is_finite() || kcal_per_gram < 0.0 {
            return Err(TeaCalError::Validation(format!(
                "Ingredient {name} has invalid calories per gram: {kcal_per_gram}"
            )));
        }
        self.per_gram.insert(name.to_string(), kcal_per_gram);
        Ok(())
    }

    /// Calories per gram, or `None` for unknown ingredients
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.per_gram.get(name).copied()
    }

    /// Calories per gram, unknown ingredients count as zero
    #[must_use]
    pub fn lookup(&self, name: &str) -> f64 {
        self.get(name).unwrap_or(0.0)
    }

    /// Table version string
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Number of ingredients
    #[must_use]
    pub fn len(&self) -> usize {
        self.per_gram.len()
    }

    /// True if the table has no ingredients
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.per_gram.is_empty()
    }

    /// Ingredient names with their values, sorted by name
    #[must_use]
    pub fn entries(&self) -> Vec<(&str, f64)> {
        let mut entries: Vec<(&str, f64)> = self
            .per_gram
            .iter()
            .map(|(name, kcal)| (name.as_str(), *kcal))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

const INGREDIENT_KCAL_PER_GRAM: &[(&str, f64)] = &[
    ("珍珠", 2.34),
    ("椰果", 0.4),
    ("芋圆", 2.0),
    ("红豆", 2.38),
    ("布丁", 1.5),
    ("仙草", 0.3),
    ("西米", 1.2),
    ("芋泥", 0.88),
    ("波霸", 0.72),
    ("小珍珠", 0.7),
    ("茶冻", 0.52),
    ("栀子冻", 0.58),
    ("椰奶冻", 1.54),
    ("仙草冻", 0.96),
    ("青稞", 1.44),
    ("西米明珠", 1.58),
    ("益禾布丁", 1.2),
    ("益禾红豆", 0.9),
    ("益禾椰果", 0.78),
    ("冻冻", 0.54),
    ("多肉晶球", 0.7),
    ("益禾仙草", 0.8),
    ("益禾珍珠", 2.2),
    ("葡萄果肉", 0.5),
    ("芝士奶盖", 2.4),
    ("马蹄爆爆珠", 0.72),
    ("马蹄丸子", 0.68),
    ("西柚粒", 0.3),
    ("血糯米", 2.2),
    ("奶冻", 1.2),
    ("沪上冻冻", 0.56),
    ("厚芋泥", 1.84),
    ("小多肉", 0.5),
    ("谷谷茶金砖", 0.9),
    ("米麻薯", 2.78),
    ("黑糖波波", 3.2),
    ("大多肉", 0.6),
    ("沪上芝士奶盖", 3.4),
];

/// Brands offered during onboarding
pub const TEA_BRANDS: &[&str] = &[
    "茶百道",
    "奈雪的茶",
    "蜜雪冰城",
    "一点点",
    "COCO都可",
    "益禾堂",
    "沪上阿姨",
];

const DAILY_TIPS: &[&str] = &[
    "选择三分糖比全糖可以减少约60-80千卡热量，相当于少跑10分钟步！",
    "用椰果替代珍珠，既有嚼劲又能减少近100千卡热量。",
    "奶茶中的芝士奶盖通常含有较高脂肪，建议选择轻芝士版本。",
    "茶底选择绿茶或乌龙茶，相比奶茶底热量更低。",
    "避免添加额外的糖和炼乳，可以选择天然甜味剂代替。",
    "小杯奶茶比大杯少约100-200千卡热量，适量饮用更健康。",
    "仙草和冻冻是低热量的配料选择，适合控糖人群。",
    "鲜牛奶制作的奶茶比植脂末制作的更健康，但热量可能稍高。",
    "水果茶通常比奶茶热量低，但要注意含糖量。",
    "喝奶茶后可以增加15-30分钟的步行，帮助消耗多余热量。",
];

fn drink(
    id: &str,
    name: &str,
    brand: &str,
    base_calories: f64,
    ingredients: &[&str],
    rating: f32,
) -> DrinkProduct {
    DrinkProduct {
        id: id.to_string(),
        name: name.to_string(),
        brand: brand.to_string(),
        base_calories,
        size: "中杯".to_string(),
        sugar_level: "标准糖".to_string(),
        ingredients: ingredients.iter().map(ToString::to_string).collect(),
        rating,
        category: CalorieCategory::from_kcal(base_calories),
    }
}

lazy_static! {
    static ref DEFAULT_TABLE: Arc<IngredientTable> = {
        let mut table = IngredientTable::new(INGREDIENT_TABLE_VERSION);
        for (name, kcal) in INGREDIENT_KCAL_PER_GRAM {
            table.per_gram.insert((*name).to_string(), *kcal);
        }
        Arc::new(table)
    };
    static ref DRINKS: Vec<DrinkProduct> = vec![
        drink("cbd-001", "杨枝甘露", "茶百道", 156.0, &["西柚粒", "西米"], 4.7),
        drink("cbd-002", "豆乳玉麒麟", "茶百道", 410.0, &["芋圆", "奶冻"], 4.5),
        drink("cbd-003", "招牌芋圆奶茶", "茶百道", 380.0, &["芋圆"], 4.4),
        drink("nx-001", "霸气芝士草莓", "奈雪的茶", 290.0, &["芝士奶盖"], 4.6),
        drink("nx-002", "宝藏鲜奶茶", "奈雪的茶", 520.0, &["珍珠", "布丁"], 4.3),
        drink("mx-001", "柠檬水", "蜜雪冰城", 120.0, &[], 4.2),
        drink("mx-002", "珍珠奶茶", "蜜雪冰城", 320.0, &["珍珠"], 4.1),
        drink("mx-003", "冰鲜柠檬水", "蜜雪冰城", 180.0, &[], 4.3),
        drink("yd-001", "四季春玛奇朵", "一点点", 230.0, &[], 4.6),
        drink("yd-002", "波霸奶茶", "一点点", 450.0, &["波霸"], 4.5),
        drink("coco-001", "百香果双响炮", "COCO都可", 285.0, &["椰果", "珍珠"], 4.4),
        drink("coco-002", "鲜芋牛奶西米露", "COCO都可", 390.0, &["芋泥", "西米"], 4.2),
        drink("yht-001", "烤奶", "益禾堂", 350.0, &["益禾珍珠"], 4.3),
        drink("yht-002", "薄荷奶绿", "益禾堂", 260.0, &[], 4.0),
        drink("hs-001", "鲜炖杨枝甘露", "沪上阿姨", 220.0, &["西柚粒"], 4.5),
        drink("hs-002", "血糯米奶茶", "沪上阿姨", 480.0, &["血糯米", "沪上冻冻"], 4.4),
    ];
}

/// The bundled ingredient table, shared
#[must_use]
pub fn default_ingredient_table() -> Arc<IngredientTable> {
    Arc::clone(&DEFAULT_TABLE)
}

/// All drinks in the catalog
#[must_use]
pub fn drinks() -> &'static [DrinkProduct] {
    &DRINKS
}

/// Find a drink by catalog id
#[must_use]
pub fn find_drink(id: &str) -> Option<&'static DrinkProduct> {
    DRINKS.iter().find(|d| d.id == id)
}

/// Find a drink by exact name, optionally restricted to one brand
#[must_use]
pub fn find_drink_by_name(name: &str, brand: Option<&str>) -> Option<&'static DrinkProduct> {
    DRINKS
        .iter()
        .find(|d| d.name == name && brand.map_or(true, |b| d.brand == b))
}

/// Tip of the day; the same date always yields the same tip
#[must_use]
pub fn tip_for_day(date: NaiveDate) -> &'static str {
    let index = date.num_days_from_ce().unsigned_abs() as usize % DAILY_TIPS.len();
    DAILY_TIPS[index]
}
