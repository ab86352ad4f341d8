//! Services module - request orchestration and timed view state.
//!
//! The services are **framework-agnostic**: they talk to the
//! [`StateManager`](crate::state::StateManager) and never to a particular
//! rendering shell.
//!
//! # Components
//!
//! - [`CheatSlipsClient`]: HTTP client for the `token` and `cheats` endpoints.
//!   Converts every outcome into `Result<_, RequestError>`.
//! - [`AuthSession`]: validates credentials, exchanges them for an
//!   [`ApiToken`](crate::models::ApiToken), and replaces or clears the stored token.
//! - [`CheatCatalogQuery`]: validates the query, fetches a
//!   [`GameResult`](crate::models::GameResult) with the current token, and
//!   decides which notification the outcome produces.
//! - [`ResultDisclosure`]: expanded/copied markers plus the copy-feedback timers.
//! - [`NotificationCenter`]: one auto-expiring message per channel.
//! - [`TimerRegistry`]: keyed, cancellable delays shared by the two above.
//! - [`Clipboard`] / [`SystemClipboard`]: write-only text clipboard.
//!
//! # Error handling
//!
//! Validation, API, and transport failures are caught at the boundary of the
//! operation that produced them and turned into a notification on that
//! operation's channel. Nothing is retried.

pub mod api;
pub mod auth;
pub mod catalog;
pub mod clipboard;
pub mod disclosure;
pub mod notifications;
pub mod timers;

pub use api::{CheatSlipsClient, NETWORK_HINT, RequestError, TOKEN_HEADER};
pub use auth::AuthSession;
pub use catalog::CheatCatalogQuery;
pub use clipboard::{Clipboard, ClipboardError, SystemClipboard};
pub use disclosure::ResultDisclosure;
pub use notifications::NotificationCenter;
pub use timers::TimerRegistry;
