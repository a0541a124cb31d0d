//! TeaCal - Milk-Tea Calorie Tracker
//!
//! A Rust library for tracking milk-tea consumption against calorie
//! budgets, with local accounts and a persistent journal.
//!
//! # Features
//!
//! - Calorie calculation from a drink, cup size, sugar level and toppings
//! - Local registration, login and onboarding with hashed credentials
//! - Append-only consumption journal stored in an embedded key-value store
//! - Daily and weekly budgets, growth dashboard and achievements
//! - Debounced catalog search

/// Achievement badges and weekly goals
pub mod achievements;
/// Registration, login and profile management
pub mod auth;
/// Calorie budgets
pub mod budget;
/// Calorie calculator
pub mod calculator;
/// Bundled drink catalog and ingredient table
pub mod catalog;
/// Configuration management
pub mod config;
/// Error types
pub mod error;
/// Growth dashboard figures
pub mod growth;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Consumption journal
pub mod records;
/// Repository pattern for data access
pub mod repository;
/// Debounced drink search
pub mod search;
/// Application state
pub mod state;
/// Key-value storage backends
pub mod storage;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use calculator::{CalorieBreakdown, CalorieCalculator, CalorieInput};
pub use error::{Result, TeaCalError};
pub use models::{ConsumptionRecord, CupSize, DrinkProduct, DrinkRef, Mood, NewRecord, UserProfile};
pub use state::AppState;
pub use storage::{KeyValueStore, MemoryStore, SledStore};
