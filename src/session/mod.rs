//! Session lifecycle: token persistence, single-flight refresh and the
//! expired-session signal.
//!
//! The pieces compose into one policy: tokens are set at login, rotated by
//! [`RefreshCoordinator`] when the backend answers 401, and cleared on
//! logout or terminal refresh failure — at which point [`SessionEvents`]
//! tells the presentation layer, exactly once, to send the user back to
//! login.

pub mod events;
pub mod refresh;
pub mod store;

pub use events::SessionEvents;
pub use refresh::RefreshCoordinator;
pub use store::{Session, TokenStore};
