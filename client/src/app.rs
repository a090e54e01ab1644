//! The stamp card front end as a state machine.
//!
//! Every user action is a method. Actions that talk to the server take `&mut self` for their whole
//! duration, so a second action cannot start while a request is still in flight. State shown to
//! the user is only ever replaced by what the server confirmed; when the server cannot be reached
//! the last cached values stay on screen and the card is marked offline.

use std::time::Instant;

use crate::{
    backend::{Backend, BackendError, Credentials, ProfileForm, Registration, UserRecord},
    notice::{Notice, NoticeKind},
    screen::Screen,
    session::{CachedSession, SessionCache, SessionStore},
    MAX_STAMPS,
};

const GUEST: &str = "Guest";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// What the stamp card screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampCardView {
    pub greeting: String,
    /// One entry per stamp slot, `true` when stamped.
    pub slots: [bool; MAX_STAMPS as usize],
    pub status: String,
    pub reward: String,
    /// Set when the values come from the cache because the server was unreachable.
    pub offline: bool,
}

pub struct StampCardApp<B, S> {
    backend: B,
    cache: SessionCache<S>,
    user: Option<CurrentUser>,
    stamps: u32,
    screen: Screen,
    notice: Option<Notice>,
    offline: bool,
}

impl<B: Backend, S: SessionStore> StampCardApp<B, S> {
    pub fn new(backend: B, store: S) -> Self {
        Self {
            backend,
            cache: SessionCache::new(store),
            user: None,
            stamps: 0,
            screen: Screen::Welcome,
            notice: None,
            offline: false,
        }
    }

    /// Resumes a cached session without asking the server, or shows the welcome screen.
    pub fn start(&mut self) {
        match self.cache.load() {
            Some(session) => {
                self.user = Some(CurrentUser {
                    id: session.user_id,
                    name: session.name,
                    email: session.email,
                });
                self.stamps = session.stamps.min(MAX_STAMPS);
                self.notify(
                    NoticeKind::Ok,
                    format!("Welcome back, {}!", self.display_name()),
                );
                self.show(Screen::StampCard);
            }
            None => self.show(Screen::Welcome),
        }
    }

    /// Like [`start`](Self::start), then reconciles a restored session with the server.
    pub async fn resume(&mut self) {
        self.start();
        self.refresh().await;
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn is_visible(&self, screen: Screen) -> bool {
        self.screen == screen
    }

    pub fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    pub fn stamps(&self) -> u32 {
        self.stamps
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    /// The current notice, unless it has already faded out.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice_at(Instant::now())
    }

    pub fn notice_at(&self, now: Instant) -> Option<&Notice> {
        self.notice
            .as_ref()
            .filter(|notice| notice.is_visible_at(now))
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn card(&self) -> StampCardView {
        let mut slots = [false; MAX_STAMPS as usize];
        for (index, slot) in slots.iter_mut().enumerate() {
            *slot = (index as u32) < self.stamps;
        }
        let remaining = MAX_STAMPS.saturating_sub(self.stamps);
        StampCardView {
            greeting: format!("Hello {}", self.display_name()),
            slots,
            status: if remaining > 0 {
                format!("{} more until a free coffee", remaining)
            } else {
                "You have earned a free coffee!".to_owned()
            },
            reward: format!("You collected {} stamps.", MAX_STAMPS),
            offline: self.offline,
        }
    }

    pub fn welcome_next(&mut self) {
        self.show(Screen::Login);
    }

    pub fn to_register(&mut self) {
        self.show(Screen::Register);
    }

    pub fn register_back(&mut self) {
        self.show(Screen::Login);
    }

    pub fn stamp_added_next(&mut self) {
        self.show(Screen::StampCard);
    }

    pub fn free_back(&mut self) {
        self.show(Screen::StampCard);
    }

    pub async fn register(&mut self, name: &str, email: &str, password: &str) {
        let (email, password) = (email.trim(), password.trim());
        if email.is_empty() || password.is_empty() {
            self.notify(NoticeKind::Warn, "Please enter email and password.");
            return;
        }
        let registration = Registration {
            name: name.trim().to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
        };
        match self.backend.register(&registration).await {
            Ok(record) => {
                let name = record.name.clone().unwrap_or_default();
                self.sign_in(record, name);
                self.notify(NoticeKind::Ok, "Registration successful.");
                self.show(Screen::StampCard);
            }
            Err(e) => self.fail(e, "Registration failed."),
        }
    }

    pub async fn login(&mut self, email: &str, password: &str) {
        let (email, password) = (email.trim(), password.trim());
        if email.is_empty() || password.is_empty() {
            self.notify(NoticeKind::Warn, "Please enter email and password.");
            return;
        }
        let credentials = Credentials {
            email: email.to_owned(),
            password: password.to_owned(),
        };
        match self.backend.login(&credentials).await {
            Ok(record) => {
                let name = login_name(&record);
                self.sign_in(record, name);
                self.notify(NoticeKind::Ok, "Login successful.");
                self.show(Screen::StampCard);
            }
            Err(e) => self.fail(e, "Login failed."),
        }
    }

    /// Reconciles the cached session with the server. Does nothing when logged out.
    pub async fn refresh(&mut self) {
        let Some(id) = self.user.as_ref().map(|user| user.id) else {
            return;
        };
        match self.backend.get_user(id).await {
            Ok(record) => {
                if let Some(user) = self.user.as_mut() {
                    if let Some(name) = record.name.filter(|name| !name.is_empty()) {
                        user.name = name;
                    }
                    user.email = record.email;
                }
                self.stamps = record.stamps.min(MAX_STAMPS);
                self.confirmed();
            }
            Err(BackendError::Rejected { status: 404, .. }) => {
                log::info!("cached user {} no longer exists", id);
                self.forget();
                self.notify(NoticeKind::Warn, "Your session has expired, please log in again.");
                self.show(Screen::Login);
            }
            Err(BackendError::Unreachable(reason)) => {
                log::warn!("showing cached stamp card, server unreachable: {}", reason);
                self.offline = true;
                self.notify(NoticeKind::Warn, "Offline: showing your last known stamps.");
            }
            Err(e) => self.fail(e, "Could not refresh your stamp card."),
        }
    }

    pub async fn scan(&mut self) {
        let Some(id) = self.require_login() else {
            return;
        };
        match self.backend.scan(id).await {
            Ok(record) => {
                self.stamps = record.stamps.min(MAX_STAMPS);
                self.confirmed();
                self.show(if self.stamps >= MAX_STAMPS {
                    Screen::FreeCoffee
                } else {
                    Screen::StampAdded
                });
            }
            Err(e) => self.fail(e, "Scanning failed."),
        }
    }

    pub async fn redeem(&mut self) {
        let Some(id) = self.require_login() else {
            return;
        };
        match self.backend.redeem(id).await {
            Ok(record) => {
                self.stamps = record.stamps.min(MAX_STAMPS);
                self.confirmed();
                self.notify(NoticeKind::Ok, "Redeemed, enjoy your coffee!");
                self.show(Screen::StampCard);
            }
            Err(e) => self.fail(e, "Redeeming failed."),
        }
    }

    /// Shows the profile screen and returns its inputs prefilled with the current values.
    pub fn open_profile(&mut self) -> Option<ProfileForm> {
        let user = match &self.user {
            Some(user) => user,
            None => {
                self.notify(NoticeKind::Warn, "Please log in first.");
                return None;
            }
        };
        let form = ProfileForm {
            name: user.name.clone(),
            email: user.email.clone(),
            password: String::new(),
        };
        self.show(Screen::Profile);
        Some(form)
    }

    pub async fn save_profile(&mut self, form: ProfileForm) {
        let Some(id) = self.require_login() else {
            return;
        };
        let form = ProfileForm {
            name: form.name.trim().to_owned(),
            email: form.email.trim().to_owned(),
            password: form.password.trim().to_owned(),
        };
        match self.backend.update_user(id, &form).await {
            Ok(record) => {
                let name = record.name.clone().unwrap_or_default();
                self.sign_in(record, name);
                self.notify(NoticeKind::Ok, "Profile saved.");
                self.show(Screen::StampCard);
            }
            Err(e) => self.fail(e, "Saving your profile failed."),
        }
    }

    pub fn logout(&mut self) {
        self.forget();
        self.notify(NoticeKind::Info, "Logged out.");
        self.show(Screen::Login);
    }

    fn show(&mut self, screen: Screen) {
        log::debug!("showing {}", screen.element_id());
        self.screen = screen;
    }

    fn notify(&mut self, kind: NoticeKind, text: impl Into<String>) {
        self.notice = Some(Notice::new(kind, text));
    }

    fn display_name(&self) -> &str {
        self.user
            .as_ref()
            .map(|user| user.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(GUEST)
    }

    fn require_login(&mut self) -> Option<i64> {
        let id = self.user.as_ref().map(|user| user.id);
        if id.is_none() {
            self.notify(NoticeKind::Warn, "Please log in first.");
        }
        id
    }

    fn sign_in(&mut self, record: UserRecord, name: String) {
        self.user = Some(CurrentUser {
            id: record.id,
            name,
            email: record.email,
        });
        self.stamps = record.stamps.min(MAX_STAMPS);
        self.confirmed();
    }

    /// The server just confirmed the current state: leave offline mode and cache it.
    fn confirmed(&mut self) {
        self.offline = false;
        if let Some(user) = &self.user {
            let session = CachedSession {
                user_id: user.id,
                name: user.name.clone(),
                email: user.email.clone(),
                stamps: self.stamps,
            };
            if let Err(e) = self.cache.save(&session) {
                log::warn!("could not cache session: {}", e);
            }
        }
    }

    fn forget(&mut self) {
        self.user = None;
        self.stamps = 0;
        self.offline = false;
        if let Err(e) = self.cache.clear() {
            log::warn!("could not clear cached session: {}", e);
        }
    }

    fn fail(&mut self, error: BackendError, fallback: &str) {
        match error {
            BackendError::Unreachable(reason) => {
                log::warn!("backend unreachable: {}", reason);
                // offline only describes cached state, and there is none without a user
                self.offline = self.user.is_some();
                self.notify(NoticeKind::Error, "Backend unreachable.");
            }
            BackendError::Rejected { message, .. } => {
                self.notify(NoticeKind::Error, message.unwrap_or_else(|| fallback.to_owned()));
            }
            BackendError::InvalidResponse(reason) => {
                log::warn!("unexpected backend response: {}", reason);
                self.notify(NoticeKind::Error, fallback);
            }
        }
    }
}

/// Login falls back to the local part of the email when the user has no name.
fn login_name(record: &UserRecord) -> String {
    record
        .name
        .clone()
        .filter(|name| !name.is_empty())
        .or_else(|| {
            record
                .email
                .split('@')
                .next()
                .filter(|local| !local.is_empty())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| GUEST.to_owned())
}
