//! Transient success/error messages with an explicit expiry.

use std::time::Duration;

use tokio::time::Instant;

pub const BANNER_TTL: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BannerKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
    pub expires_at: Instant,
    serial: u64,
}

impl Banner {
    pub fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// One slot per kind; a newer message replaces the current one outright.
#[derive(Debug, Default)]
pub struct BannerSlots {
    success: Option<Banner>,
    error: Option<Banner>,
    next_serial: u64,
}

impl BannerSlots {
    /// Stores `message` and returns the serial a scheduled clear must present.
    pub fn post(&mut self, kind: BannerKind, message: impl Into<String>, now: Instant) -> u64 {
        self.next_serial += 1;
        let serial = self.next_serial;
        *self.slot_mut(kind) = Some(Banner {
            kind,
            message: message.into(),
            expires_at: now + BANNER_TTL,
            serial,
        });
        serial
    }

    /// Clears the slot only if it still holds the banner with `serial`.
    pub fn expire(&mut self, kind: BannerKind, serial: u64) -> bool {
        let slot = self.slot_mut(kind);
        if slot.as_ref().is_some_and(|banner| banner.serial == serial) {
            *slot = None;
            return true;
        }
        false
    }

    pub fn live(&self, kind: BannerKind, now: Instant) -> Option<&Banner> {
        let slot = match kind {
            BannerKind::Success => &self.success,
            BannerKind::Error => &self.error,
        };
        slot.as_ref().filter(|banner| banner.is_live(now))
    }

    pub fn clear(&mut self) {
        self.success = None;
        self.error = None;
    }

    fn slot_mut(&mut self, kind: BannerKind) -> &mut Option<Banner> {
        match kind {
            BannerKind::Success => &mut self.success,
            BannerKind::Error => &mut self.error,
        }
    }
}
