pub mod app;
pub mod config;
pub mod controller;
pub mod editor;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod plan_state;
pub mod preferences;
pub mod state;
pub mod storage;
pub mod store;
pub mod totals;
pub mod view;

pub use app::router;
pub use controller::DayPlanController;
pub use state::AppState;
pub use storage::load_book;
pub use store::{HttpPlanStore, PlanStore};
