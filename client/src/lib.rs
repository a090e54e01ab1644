//! Client side of the stamp card: the screen state machine, the local session cache that lets a
//! user pick up where they left off, and the HTTP backend it talks to.

pub mod app;
pub mod backend;
pub mod http;
pub mod notice;
pub mod screen;
pub mod session;

pub use app::{CurrentUser, StampCardApp, StampCardView};
pub use backend::{Backend, BackendError, ProfileForm};
pub use http::HttpBackend;
pub use notice::{Notice, NoticeKind};
pub use screen::Screen;
pub use session::{CachedSession, FileStore, MemoryStore, SessionCache, SessionStore};

/// Stamps needed for a free coffee. Mirrors the server's limit.
pub const MAX_STAMPS: u32 = 5;
