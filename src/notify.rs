//! Transient toast messages.
//!
//! One toast is visible at a time: showing a new one removes the current
//! toast (and any that are mid-exit) immediately. A toast auto-dismisses
//! after `dismiss_ms`, or earlier via its close button; either way it plays
//! an `exit_ms` exit animation before being removed. Timer tasks carry the
//! toast id so a stale expiry can never dismiss a newer toast.

use crate::markup;
use crate::page::Page;
use crate::timers::{Task, TimerId, Timers};
use crate::types::{Millis, NotificationKind};

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    expiry: TimerId,
}

#[derive(Debug)]
pub struct NotificationCenter {
    dismiss_ms: Millis,
    exit_ms: Millis,
    next_id: u64,
    current: Option<Toast>,
    exiting: Vec<(u64, TimerId)>,
}

impl NotificationCenter {
    pub fn new(dismiss_ms: Millis, exit_ms: Millis) -> Self {
        Self {
            dismiss_ms,
            exit_ms,
            next_id: 0,
            current: None,
            exiting: Vec::new(),
        }
    }

    /// The toast currently on screen and not yet leaving.
    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    pub fn show(
        &mut self,
        kind: NotificationKind,
        message: &str,
        page: &mut impl Page,
        timers: &mut Timers,
    ) -> u64 {
        if let Some(old) = self.current.take() {
            timers.cancel(old.expiry);
            page.remove_notification(old.id);
        }
        for (id, removal) in self.exiting.drain(..) {
            timers.cancel(removal);
            page.remove_notification(id);
        }

        self.next_id += 1;
        let id = self.next_id;
        page.show_notification(id, kind, markup::notification(kind, message));
        let expiry = timers.set_timeout(self.dismiss_ms, Task::ExpireNotification(id));
        tracing::debug!(id, kind = kind.class(), message, "notification shown");

        self.current = Some(Toast {
            id,
            kind,
            message: message.to_string(),
            expiry,
        });
        id
    }

    pub fn success(&mut self, message: &str, page: &mut impl Page, timers: &mut Timers) -> u64 {
        self.show(NotificationKind::Success, message, page, timers)
    }

    pub fn error(&mut self, message: &str, page: &mut impl Page, timers: &mut Timers) -> u64 {
        self.show(NotificationKind::Error, message, page, timers)
    }

    /// Manual close. Cancels the auto-dismiss timer.
    pub fn close(&mut self, id: u64, page: &mut impl Page, timers: &mut Timers) -> bool {
        match self.current.take_if(|toast| toast.id == id) {
            Some(toast) => {
                timers.cancel(toast.expiry);
                self.begin_exit(id, page, timers);
                true
            }
            None => false,
        }
    }

    /// Auto-dismiss timer fired.
    pub fn expire(&mut self, id: u64, page: &mut impl Page, timers: &mut Timers) {
        if self.current.take_if(|toast| toast.id == id).is_some() {
            self.begin_exit(id, page, timers);
        }
    }

    /// Exit animation finished.
    pub fn remove(&mut self, id: u64, page: &mut impl Page) {
        if let Some(pos) = self.exiting.iter().position(|(exiting, _)| *exiting == id) {
            self.exiting.remove(pos);
            page.remove_notification(id);
        }
    }

    fn begin_exit(&mut self, id: u64, page: &mut impl Page, timers: &mut Timers) {
        page.begin_notification_exit(id);
        let removal = timers.set_timeout(self.exit_ms, Task::RemoveNotification(id));
        self.exiting.push((id, removal));
    }
}
