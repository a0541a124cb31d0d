//! `teacal` command-line front end.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, error, info};

use teacal::achievements::{self, AchievementCategory};
use teacal::auth::ProfileStore;
use teacal::budget::BudgetSettings;
use teacal::catalog;
use teacal::config::AppConfig;
use teacal::growth;
use teacal::logging::{init_logging, OperationTimer};
use teacal::metrics::MetricsCollector;
use teacal::models::{DrinkProduct, DrinkRef, ProfileUpdate, SweetnessPreference};
use teacal::storage::SledStore;
use teacal::validation::InputValidator;
use teacal::{AppState, CalorieInput, CupSize, Mood, NewRecord, TeaCalError};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a local account (/auth/register)
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,

        /// Repeat the password
        #[arg(short, long)]
        confirm: Option<String>,
    },
    /// Sign in (/auth/login)
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Finish onboarding after registering (/onboarding)
    Onboard {
        /// Weight in kg
        #[arg(long)]
        weight: f64,

        /// Height in cm
        #[arg(long)]
        height: f64,

        #[arg(long)]
        age: u32,

        /// no_sugar, low, medium, high or full
        #[arg(long)]
        sweetness: Option<SweetnessPreference>,

        /// Favourite brand, may be repeated
        #[arg(long = "brand")]
        brands: Vec<String>,
    },
    /// Show or edit the signed-in profile (/profile)
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Calculate the calories of a drink (/calculator)
    Calc {
        /// Catalog drink id or name
        #[arg(short, long)]
        drink: Option<String>,

        /// Brand, to disambiguate drink names
        #[arg(short, long)]
        brand: Option<String>,

        /// small, medium or large
        #[arg(short, long)]
        size: Option<CupSize>,

        /// Sugar percentage, 0-100
        #[arg(long)]
        sugar: Option<f64>,

        /// Topping as NAME=GRAMS, may be repeated
        #[arg(short, long = "ingredient", value_parser = parse_ingredient)]
        ingredients: Vec<(String, f64)>,
    },
    /// Search the drink catalog
    Search {
        query: String,
    },
    /// Add to or list the journal (/my-records)
    Record {
        #[command(subcommand)]
        action: RecordAction,
    },
    /// Show or change the calorie budget
    Budget {
        #[command(subcommand)]
        action: BudgetAction,
    },
    /// Growth dashboard (/dashboard)
    Dashboard {
        /// Days in the calorie chart
        #[arg(short, long, default_value = "7")]
        days: u32,
    },
    /// Achievements and weekly goals (/health-tasks)
    Achievements {
        /// record, health, social or milestone
        #[arg(short, long)]
        category: Option<Category>,
    },
    /// Share the journal
    Share,
    /// Tip of the day (/recommendations)
    Tip,
    /// Remove stored user data left by an older version
    ClearData,
    /// Print the effective configuration
    Config,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print the signed-in profile
    Show,
    /// Change profile fields
    Update {
        #[arg(long)]
        weight: Option<f64>,

        #[arg(long)]
        height: Option<f64>,

        #[arg(long)]
        age: Option<u32>,

        #[arg(long)]
        sweetness: Option<SweetnessPreference>,

        /// Replace favourite brands, may be repeated
        #[arg(long = "brand")]
        brands: Vec<String>,
    },
}

#[derive(Subcommand)]
enum RecordAction {
    /// Record a drink
    Add {
        /// Catalog drink id or name
        #[arg(short, long)]
        drink: String,

        #[arg(short, long)]
        brand: Option<String>,

        #[arg(short, long)]
        size: Option<CupSize>,

        /// Sugar percentage, 0-100
        #[arg(long)]
        sugar: Option<u8>,

        /// happy, relaxed, conflicted or celebrating
        #[arg(short, long, default_value = "happy")]
        mood: Mood,

        #[arg(short, long, default_value = "")]
        notes: String,
    },
    /// List recorded drinks
    List {
        /// Newest first
        #[arg(short, long)]
        recent: bool,
    },
}

#[derive(Subcommand)]
enum BudgetAction {
    /// Today, this week and recent history
    Show {
        #[arg(short, long, default_value = "7")]
        days: u32,
    },
    /// Set budgets directly
    Set {
        #[arg(long)]
        daily: Option<u32>,

        #[arg(long)]
        weekly: Option<u32>,
    },
    /// Move a budget one step up or down
    Step {
        #[arg(value_enum)]
        period: Period,

        #[arg(value_enum)]
        direction: Direction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Period {
    Daily,
    Weekly,
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    Up,
    Down,
}

#[derive(Clone, Copy, ValueEnum)]
enum Category {
    Record,
    Health,
    Social,
    Milestone,
}

impl From<Category> for AchievementCategory {
    fn from(category: Category) -> Self {
        match category {
            Category::Record => Self::Record,
            Category::Health => Self::Health,
            Category::Social => Self::Social,
            Category::Milestone => Self::Milestone,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging; the guard flushes the file writer on exit
    let log_file = config.logging.file_path.as_ref().map(PathBuf::from);
    let log_guard = init_logging(
        Some(&config.get_log_level()),
        log_file.as_deref(),
        config.logging.format == "json",
    )?;
    MetricsCollector::init()?;

    info!("Starting teacal");

    // Parse command line arguments
    let cli = Cli::parse();

    if let Err(e) = run(cli.command, &config).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {e:#}");
        if e
            .downcast_ref::<TeaCalError>()
            .is_some_and(TeaCalError::needs_clear_data)
        {
            eprintln!("Stored data comes from an older version. Run `teacal clear-data` and register again.");
        } else if matches!(e.downcast_ref::<TeaCalError>(), Some(TeaCalError::NotFound(_))) {
            eprintln!("If your session expired, please log in again.");
        }
        drop(log_guard);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Commands, config: &AppConfig) -> Result<()> {
    // These two must work even when stored data cannot be loaded
    match command {
        Commands::ClearData => return clear_data(config),
        Commands::Config => {
            print!("{}", config.to_yaml()?);
            return Ok(());
        },
        _ => {},
    }

    let timer = OperationTimer::new("open_state").with_metrics(MetricsCollector::default());
    let mut state = AppState::open_sled(config).context("Failed to open storage")?;
    timer.finish();
    let today = Local::now().date_naive();

    match command {
        Commands::Register {
            username,
            password,
            confirm,
        } => {
            let user = match confirm {
                Some(confirm) => {
                    state
                        .profiles
                        .register_with_confirmation(&username, &password, &confirm)?
                },
                None => state.profiles.register(&username, &password)?,
            };
            println!("Registered {}. Next: teacal onboard --weight .. --height .. --age ..", user.username);
        },
        Commands::Login { username, password } => {
            let user = state.profiles.login(&username, &password)?;
            println!("Welcome back, {}!", user.username);
            if !user.is_onboarded() {
                println!("Your profile is incomplete: teacal profile update --weight .. --height .. --age ..");
            }
        },
        Commands::Logout => {
            state.profiles.logout()?;
            println!("Signed out");
        },
        Commands::Onboard {
            weight,
            height,
            age,
            sweetness,
            brands,
        } => {
            let update = ProfileUpdate {
                weight: Some(weight),
                height: Some(height),
                age: Some(age),
                sweetness_preference: sweetness,
                favorite_brands: brand_set(brands),
            };
            let user = state.profiles.complete_onboarding(&update)?;
            println!("Profile saved. Welcome, {}!", user.username);
        },
        Commands::Profile { action } => profile(&mut state, action)?,
        Commands::Calc {
            drink,
            brand,
            size,
            sugar,
            ingredients,
        } => {
            let mut input = match drink {
                Some(drink) => CalorieInput::for_drink(lookup_drink(&drink, brand.as_deref())?),
                None => CalorieInput::default(),
            };
            if let Some(size) = size {
                input = input.with_cup_size(size);
            }
            if let Some(sugar) = sugar {
                InputValidator::validate_sugar_level(sugar)?;
                input = input.with_sugar_level(sugar);
            }
            for (name, grams) in ingredients {
                InputValidator::validate_grams(&name, grams)?;
                input = input.with_ingredient(&name, grams);
            }
            if input.is_empty() {
                anyhow::bail!("Choose a drink or at least one ingredient");
            }

            let breakdown = state.calculate(&input);
            println!("Base:        {:>6.1} kcal", breakdown.base);
            println!("Sugar:       {:>6.1} kcal", breakdown.sugar);
            println!("Ingredients: {:>6.1} kcal", breakdown.ingredients);
            println!("Total:       {:>6} kcal", breakdown.display_kcal());
            println!(
                "About {} minutes of exercise to burn it off",
                state.calculator.exercise_minutes(breakdown.total)
            );
        },
        Commands::Search { query } => match state.search.debounced(&query).await {
            Some(results) if results.is_empty() => println!("No drinks match \"{query}\""),
            Some(results) => {
                for drink in results {
                    print_drink(&drink);
                }
            },
            None => debug!("Search superseded"),
        },
        Commands::Record { action } => record(&mut state, action)?,
        Commands::Budget { action } => budget(&mut state, action, today)?,
        Commands::Dashboard { days } => dashboard(&state, days, today),
        Commands::Achievements { category } => show_achievements(&state, category, today)?,
        Commands::Share => {
            let count = state.share()?;
            println!("Thanks for sharing! ({count} shares so far)");
        },
        Commands::Tip => println!("{}", catalog::tip_for_day(today)),
        Commands::ClearData | Commands::Config => {},
    }

    Ok(())
}

fn clear_data(config: &AppConfig) -> Result<()> {
    let store = SledStore::open(&config.get_storage_path(), config.storage.flush_on_write)
        .context("Failed to open storage")?;
    ProfileStore::clear_legacy_data(&store)?;
    println!("Old user data cleared. Please register again.");
    Ok(())
}

fn profile(state: &mut AppState, action: ProfileAction) -> Result<()> {
    let user = state.profiles.require_current_user()?;
    match action {
        ProfileAction::Show => {
            println!("Username:  {}", user.username);
            println!("Weight:    {}", show_opt(user.weight, "kg"));
            println!("Height:    {}", show_opt(user.height, "cm"));
            println!("Age:       {}", show_opt(user.age, ""));
            println!("Sweetness: {}", user.sweetness_preference.as_str());
            if !user.favorite_brands.is_empty() {
                let brands: Vec<&str> = user.favorite_brands.iter().map(String::as_str).collect();
                println!("Brands:    {}", brands.join(", "));
            }
            println!("Member since {}", user.created_at.with_timezone(&Local).format("%Y-%m-%d"));
        },
        ProfileAction::Update {
            weight,
            height,
            age,
            sweetness,
            brands,
        } => {
            let update = ProfileUpdate {
                weight,
                height,
                age,
                sweetness_preference: sweetness,
                favorite_brands: brand_set(brands),
            };
            state.profiles.update_profile(&user.id, &update)?;
            println!("Profile updated");
        },
    }
    Ok(())
}

fn record(state: &mut AppState, action: RecordAction) -> Result<()> {
    match action {
        RecordAction::Add {
            drink,
            brand,
            size,
            sugar,
            mood,
            notes,
        } => {
            let product = lookup_drink(&drink, brand.as_deref())?;
            let mut input = CalorieInput::for_drink(product);
            if let Some(size) = size {
                input = input.with_cup_size(size);
            }
            if let Some(sugar) = sugar {
                input = input.with_sugar_level(f64::from(sugar));
            }
            let kcal = state.calculate(&input).total.round();

            let record = state.records.append(NewRecord {
                drink: Some(DrinkRef {
                    name: product.name.clone(),
                    brand: product.brand.clone(),
                    calories: kcal,
                }),
                cup_size: size,
                sugar_level: sugar,
                mood,
                notes,
            })?;
            println!(
                "Recorded {} ({}) {} kcal [{}]",
                record.drink_ref.name,
                record.drink_ref.brand,
                record.drink_ref.calories,
                record.category().as_str()
            );
        },
        RecordAction::List { recent } => {
            let records = if recent {
                state.records.list_recent()
            } else {
                state.records.list().to_vec()
            };
            if records.is_empty() {
                println!("No records yet");
            }
            for record in records {
                println!(
                    "{}  {} ({})  {} kcal  {}{}",
                    record.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    record.drink_ref.name,
                    record.drink_ref.brand,
                    record.drink_ref.calories,
                    record.mood,
                    if record.notes.is_empty() {
                        String::new()
                    } else {
                        format!("  \"{}\"", record.notes)
                    }
                );
            }
        },
    }
    Ok(())
}

fn budget(state: &mut AppState, action: BudgetAction, today: NaiveDate) -> Result<()> {
    match action {
        BudgetAction::Show { days } => {
            let tracker = state.budget_tracker();
            let day = tracker.today(today);
            let week = tracker.week(today);
            println!(
                "Today: {:.0}/{} kcal ({}%), {:.0} kcal left",
                day.consumed, day.budget, day.usage_percent, day.remaining
            );
            println!(
                "Week:  {:.0}/{} kcal ({}%), {:.0} kcal left",
                week.consumed, week.budget, week.usage_percent, week.remaining
            );
            for row in tracker.history(today, days) {
                println!("{}  {:>5.0} kcal  {}", row.date, row.consumed, row.status.as_str());
            }
        },
        BudgetAction::Set { daily, weekly } => {
            let current = state.budget();
            let settings = BudgetSettings::new(
                daily.unwrap_or(current.daily_kcal),
                weekly.unwrap_or(current.weekly_kcal),
            )?;
            state.set_budget(settings)?;
            println!("Budget: {} kcal/day, {} kcal/week", settings.daily_kcal, settings.weekly_kcal);
        },
        BudgetAction::Step { period, direction } => {
            let mut settings = state.budget();
            match (period, direction) {
                (Period::Daily, Direction::Up) => settings.increase_daily(),
                (Period::Daily, Direction::Down) => settings.decrease_daily(),
                (Period::Weekly, Direction::Up) => settings.increase_weekly(),
                (Period::Weekly, Direction::Down) => settings.decrease_weekly(),
            }
            state.set_budget(settings)?;
            println!("Budget: {} kcal/day, {} kcal/week", settings.daily_kcal, settings.weekly_kcal);
        },
    }
    Ok(())
}

fn dashboard(state: &AppState, days: u32, today: NaiveDate) {
    let summary = state.growth(today);
    println!("This week: {:.0} kcal/day", summary.current_week_average);
    println!("Last week: {:.0} kcal/day", summary.last_week_average);
    println!("Improvement: {}%", summary.improvement_percent);
    println!("Low-cal share: {}%", summary.low_cal_share_percent);
    println!(
        "Streak: {} days ({} to go for the monthly goal)",
        summary.streak_days, summary.days_to_monthly_goal
    );

    println!();
    for point in growth::daily_series(state.records.list(), today, days) {
        println!(
            "{}  {:>5.0} kcal{}",
            point.date.format("%m-%d"),
            point.calories,
            if point.low_cal { "  low" } else { "" }
        );
    }

    println!();
    for share in growth::category_distribution(state.records.list()) {
        println!("{:<6} {:>3} records  {:>3}%", share.category.as_str(), share.count, share.percent);
    }
}

fn show_achievements(state: &AppState, category: Option<Category>, today: NaiveDate) -> Result<()> {
    let all = state.achievements(today)?;
    let summary = achievements::summarize(&all);
    println!("{}/{} unlocked ({}%)", summary.completed, summary.total, summary.percent);

    let shown = match category {
        Some(category) => achievements::filter_by_category(&all, category.into()),
        None => all.iter().collect(),
    };
    for a in shown {
        let status = match a.completed_date {
            Some(date) if a.completed => format!("done {date}"),
            _ if a.completed => "done".to_string(),
            _ => format!("{}/{}", a.progress, a.max_progress),
        };
        println!("{} {:<12} {:<10} {}", a.icon, a.title, status, a.description);
    }

    println!();
    println!("Weekly goals:");
    for goal in state.weekly_goals(today)? {
        let mark = if goal.is_done() { "x" } else { " " };
        println!("[{mark}] {} ({}/{}), reward: {}", goal.title, goal.progress, goal.max, goal.reward);
    }
    Ok(())
}

fn lookup_drink(drink: &str, brand: Option<&str>) -> Result<&'static DrinkProduct> {
    catalog::find_drink(drink)
        .or_else(|| catalog::find_drink_by_name(drink, brand))
        .ok_or_else(|| TeaCalError::NotFound(format!("drink {drink}")).into())
}

fn print_drink(drink: &DrinkProduct) {
    println!(
        "{:<8} {} ({})  {} kcal  {}",
        drink.id,
        drink.name,
        drink.brand,
        drink.base_calories,
        drink.category.as_str()
    );
}

fn brand_set(brands: Vec<String>) -> Option<BTreeSet<String>> {
    if brands.is_empty() {
        None
    } else {
        Some(brands.into_iter().collect())
    }
}

fn show_opt<T: std::fmt::Display>(value: Option<T>, unit: &str) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v}{unit}"))
}

/// Parse `NAME=GRAMS`
fn parse_ingredient(raw: &str) -> std::result::Result<(String, f64), String> {
    let (name, grams) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=GRAMS, got {raw}"))?;
    let grams: f64 = grams
        .trim()
        .parse()
        .map_err(|e| format!("invalid grams in {raw}: {e}"))?;
    Ok((name.trim().to_string(), grams))
}
