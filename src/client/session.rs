//! Dashboard session state.
//!
//! Every session event starts a new hydration generation. A hydration result only lands
//! when its ticket belongs to the latest generation, so a slow lookup for a previous
//! session can never overwrite a newer state.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::sea_orm_active_enums::UserRole;
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unauthenticated,
    /// Session known, role and profile still loading.
    Resolving { session: Session },
    Ready { session: Session, user: AuthUser },
}

impl SessionState {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            SessionState::Ready { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Resolving { .. })
    }
}

/// The two independent identity lookups.
pub trait IdentityLookup: Send + Sync {
    fn role(&self, session: &Session) -> impl Future<Output = AppResult<Option<UserRole>>> + Send;
    fn profile_name(&self, session: &Session) -> impl Future<Output = AppResult<Option<String>>> + Send;
}

#[derive(Debug, Clone, PartialEq)]
pub struct HydrationTicket {
    generation: u64,
    session: Session,
}

impl HydrationTicket {
    pub fn session(&self) -> &Session {
        &self.session
    }
}

pub struct SessionTracker {
    generation: AtomicU64,
    state: watch::Sender<SessionState>,
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTracker {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::Unauthenticated);
        Self {
            generation: AtomicU64::new(0),
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Record a session event. Returns the ticket to hydrate with, or `None` after sign-out.
    pub fn begin(&self, session: Option<Session>) -> Option<HydrationTicket> {
        let mut ticket = None;
        self.state.send_modify(|state| {
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            match session {
                Some(session) => {
                    *state = SessionState::Resolving {
                        session: session.clone(),
                    };
                    ticket = Some(HydrationTicket { generation, session });
                }
                None => *state = SessionState::Unauthenticated,
            }
        });
        ticket
    }

    /// Publish a hydrated user. Stale tickets are dropped and `false` is returned.
    pub fn commit(&self, ticket: HydrationTicket, user: AuthUser) -> bool {
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != ticket.generation {
                debug!("Dropping stale hydration for {}", ticket.session.user_id);
                return false;
            }
            *state = SessionState::Ready {
                session: ticket.session,
                user,
            };
            true
        })
    }

    /// Run both lookups concurrently and commit the result. Failed lookups use defaults.
    pub async fn hydrate<L: IdentityLookup>(&self, lookup: &L, ticket: HydrationTicket) -> bool {
        let session = ticket.session();
        let (role, name) = tokio::join!(lookup.role(session), lookup.profile_name(session));

        let role = role
            .inspect_err(|e| warn!("Role lookup failed: {}", e))
            .ok()
            .flatten();
        let name = name
            .inspect_err(|e| warn!("Profile lookup failed: {}", e))
            .ok()
            .flatten();

        let user = AuthUser::hydrate(session.user_id, &session.email, role, name);
        self.commit(ticket, user)
    }

    /// `begin` followed by `hydrate`.
    pub async fn on_session_change<L: IdentityLookup>(&self, lookup: &L, session: Option<Session>) -> bool {
        match self.begin(session) {
            Some(ticket) => self.hydrate(lookup, ticket).await,
            None => true,
        }
    }
}
