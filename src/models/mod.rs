//! Data models for the CheatHub client.
//!
//! - [`AppState`]: everything the rendering shell displays, owned by
//!   [`StateManager`](crate::state::StateManager)
//! - [`GameResult`] / [`CheatFile`]: catalog response shapes
//! - [`ApiToken`] / [`Credentials`] / [`QueryInput`]: session and form input
//! - [`DisclosureState`]: expanded/copied markers keyed by cheat id
//! - [`Notification`]: transient per-channel messages
//! - [`UserConfig`]: settings loaded from `CheatHub Config.yaml`

pub mod app_state;
pub mod catalog;
pub mod config;
pub mod disclosure;
pub mod notification;
pub mod session;

pub use app_state::AppState;
pub use catalog::{ApiErrorBody, CheatFile, GameResult};
pub use config::{DEFAULT_API_BASE_URL, HubSettings, Timings, UserConfig};
pub use disclosure::DisclosureState;
pub use notification::{Channel, Notification, Severity};
pub use session::{ApiToken, Credentials, QueryInput};
