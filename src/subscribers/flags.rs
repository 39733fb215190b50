//! # Subscription flags.
//!
//! [`ListenFlags`] is a small bitset attached to every subscription. Flags are
//! independent and combine with `|`:
//!
//! ```rust
//! use eventvisor::ListenFlags;
//!
//! let flags = ListenFlags::ONCE | ListenFlags::ONLY_IF_ACTIVE;
//! assert!(flags.contains(ListenFlags::ONCE));
//! assert!(!flags.contains(ListenFlags::EXTERNALLY_MANAGED));
//! ```

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Per-subscription behaviour flags.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ListenFlags(u8);

impl ListenFlags {
    /// No flags.
    pub const NONE: Self = Self(0);

    /// Skip invocation (but stay subscribed) while the owner reports itself inactive.
    pub const ONLY_IF_ACTIVE: Self = Self(1 << 0);

    /// Remove the subscription after its first invocation.
    pub const ONCE: Self = Self(1 << 1);

    /// Do not fire during the `raise` in which the subscription was created.
    ///
    /// Dropped at registration time when no dispatch of that type is in flight.
    pub const SUPPRESS_IF_ADDED_DURING_DISPATCH: Self = Self(1 << 2);

    /// Owner liveness is decided by [`Liveness::is_alive`](crate::Liveness::is_alive)
    /// rather than only by the owner allocation still existing.
    pub const EXTERNALLY_MANAGED: Self = Self(1 << 3);

    const ALL: [(Self, &'static str); 4] = [
        (Self::ONLY_IF_ACTIVE, "ONLY_IF_ACTIVE"),
        (Self::ONCE, "ONCE"),
        (
            Self::SUPPRESS_IF_ADDED_DURING_DISPATCH,
            "SUPPRESS_IF_ADDED_DURING_DISPATCH",
        ),
        (Self::EXTERNALLY_MANAGED, "EXTERNALLY_MANAGED"),
    ];

    /// Returns true if every flag in `other` is set.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if no flag is set.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns a copy with the flags in `other` cleared.
    #[inline]
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    #[inline]
    pub(crate) fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl BitOr for ListenFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ListenFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for ListenFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("ListenFlags(NONE)");
        }
        let names: Vec<&str> = Self::ALL
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "ListenFlags({})", names.join(" | "))
    }
}
