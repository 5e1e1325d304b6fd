pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;

pub use auth::{BotTokenValidator, InitDataValidator, MockInitDataValidator, TelegramUser};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{Amount, GameDate, PlayerId, PlayerRecord, TimeMs};
pub use error::AppError;
