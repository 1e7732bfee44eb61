//! Deletion flow: confirm, request, update, notify.
//!
//! ```text
//! Idle ──request──▶ ConfirmPending ──confirm──▶ InFlight ──2xx──▶ Settled(ok)
//!   ▲                    │                          └──error──▶ Settled(failed)
//!   └──────cancel────────┘                                           │
//!   └────────────────────────────dismiss / timeout───────────────────┘
//! ```
//!
//! At most one delete request is issued per pending deletion: `confirm`
//! hands out a single [`DeleteTicket`] and is ignored while the request is
//! in flight. The collection is only touched after the server confirms the
//! delete.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::Resource;
use crate::error::{CatalogError, Result};
use crate::remote::{CatalogApi, GENERIC_MUTATION_FAILURE};

use super::overlay::{ConfirmDialogView, Notification};
use super::{ItemId, ListManager, Listable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum DeletionPhase {
    #[default]
    Idle,
    ConfirmPending {
        item_id: ItemId,
    },
    InFlight {
        item_id: ItemId,
    },
    Settled {
        item_id: ItemId,
        succeeded: bool,
    },
}

impl DeletionPhase {
    pub fn item_id(&self) -> Option<ItemId> {
        match *self {
            DeletionPhase::Idle => None,
            DeletionPhase::ConfirmPending { item_id }
            | DeletionPhase::InFlight { item_id }
            | DeletionPhase::Settled { item_id, .. } => Some(item_id),
        }
    }
}

/// Permission to issue exactly one delete request.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "issue the request and pass the ticket to complete"]
pub struct DeleteTicket {
    item_id: ItemId,
    attempt: u64,
}

impl DeleteTicket {
    pub fn item_id(&self) -> ItemId {
        self.item_id
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeletionCoordinator {
    phase: DeletionPhase,
    notification: Option<Notification>,
    auto_dismiss: Option<Duration>,
    attempts: u64,
}

impl DeletionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Auto-dismiss result notifications after `timeout`.
    pub fn with_auto_dismiss(mut self, timeout: Option<Duration>) -> Self {
        self.auto_dismiss = timeout;
        self
    }

    pub fn phase(&self) -> DeletionPhase {
        self.phase
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.phase, DeletionPhase::InFlight { .. })
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// Confirmation dialog, open while a deletion awaits confirmation or is
    /// in flight.
    pub fn confirm_view(&self, label: &str) -> Option<ConfirmDialogView> {
        match self.phase {
            DeletionPhase::ConfirmPending { item_id } => {
                Some(ConfirmDialogView::new(item_id, label, false))
            }
            DeletionPhase::InFlight { item_id } => Some(ConfirmDialogView::new(item_id, label, true)),
            _ => None,
        }
    }

    /// Ask for confirmation to delete `item_id`. Only possible when idle.
    pub fn request_delete(&mut self, item_id: ItemId) -> bool {
        if self.phase != DeletionPhase::Idle {
            debug!(?self.phase, "delete request ignored, coordinator busy");
            return false;
        }
        self.phase = DeletionPhase::ConfirmPending { item_id };
        true
    }

    /// Drop the pending deletion. Ignored once the request is in flight.
    pub fn cancel(&mut self) -> bool {
        if let DeletionPhase::ConfirmPending { .. } = self.phase {
            self.phase = DeletionPhase::Idle;
            true
        } else {
            false
        }
    }

    /// Confirm the pending deletion. Returns the ticket for the single
    /// request to issue, or `None` if there is nothing to confirm (including
    /// a repeated confirm while the request is in flight).
    pub fn confirm(&mut self) -> Option<DeleteTicket> {
        let DeletionPhase::ConfirmPending { item_id } = self.phase else {
            return None;
        };
        self.attempts += 1;
        self.phase = DeletionPhase::InFlight { item_id };
        Some(DeleteTicket {
            item_id,
            attempt: self.attempts,
        })
    }

    /// Settle the in-flight request.
    ///
    /// On success the item is removed from `manager` (which re-clamps its
    /// page) and a success notification opens. On failure the collection is
    /// left alone and an error notification carries the server's message.
    pub fn complete<T: Listable + Clone>(
        &mut self,
        ticket: DeleteTicket,
        result: Result<()>,
        manager: &mut ListManager<T>,
    ) -> bool {
        if self.phase != (DeletionPhase::InFlight { item_id: ticket.item_id })
            || ticket.attempt != self.attempts
        {
            warn!(item_id = %ticket.item_id, "ignoring completion for a delete that is not in flight");
            return false;
        }

        let item_id = ticket.item_id;
        let notification = match result {
            Ok(()) => {
                manager.remove_item(item_id);
                info!(%item_id, "item deleted");
                self.phase = DeletionPhase::Settled {
                    item_id,
                    succeeded: true,
                };
                Notification::success("Deleted", format!("Item {item_id} was deleted."))
            }
            Err(err) => {
                let message = failure_message(err.into_mutation_error());
                warn!(%item_id, error = %message, "delete failed");
                self.phase = DeletionPhase::Settled {
                    item_id,
                    succeeded: false,
                };
                Notification::error("Delete failed", message)
            }
        };
        self.notification = Some(notification.with_auto_dismiss(self.auto_dismiss));
        true
    }

    /// Close the result notification and return to idle.
    pub fn dismiss(&mut self) {
        if let DeletionPhase::Settled { .. } = self.phase {
            self.phase = DeletionPhase::Idle;
        }
        self.notification = None;
    }

    /// Dismiss the notification if its timeout has run out.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.notification.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.dismiss();
            true
        } else {
            false
        }
    }

    /// Confirm and run the pending deletion against `api`.
    ///
    /// Returns the opened notification, or `None` if there was nothing to
    /// confirm. A session that cannot be recovered is returned as
    /// [`CatalogError::SessionExpired`] after the error notification opens.
    pub async fn confirm_delete<A, T>(
        &mut self,
        api: &A,
        manager: &mut ListManager<T>,
    ) -> Result<Option<Notification>>
    where
        A: CatalogApi,
        T: Resource,
    {
        let Some(ticket) = self.confirm() else {
            return Ok(None);
        };

        let result = match manager.find(ticket.item_id()) {
            Some(item) => {
                let endpoint = item.delete_endpoint();
                debug!(%endpoint, "sending delete");
                api.delete(&endpoint).await
            }
            None => Err(CatalogError::NotFound(format!("item {}", ticket.item_id()))),
        };

        let expired = matches!(result, Err(CatalogError::SessionExpired));
        self.complete(ticket, result, manager);
        if expired {
            return Err(CatalogError::SessionExpired);
        }
        Ok(self.notification.clone())
    }
}

pub(super) fn failure_message(err: CatalogError) -> String {
    let message = match err {
        CatalogError::Mutation { message, .. } => message,
        other => other.to_string(),
    };
    if message.trim().is_empty() {
        GENERIC_MUTATION_FAILURE.to_string()
    } else {
        message
    }
}
