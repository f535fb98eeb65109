//! Permission and status bit sets.
//!
//! Applications define up to 32 permissions and 32 statuses as single-bit
//! constants and combine them with `|`:
//!
//! ```
//! use porter_auth::permissions::{Permission, Permissions};
//!
//! const READ: Permission = Permission::bit(0);
//! const WRITE: Permission = Permission::bit(1);
//! const DELETE: Permission = Permission::bit(2);
//!
//! let mut perms = Permissions::default();
//! perms.add_permissions(READ | WRITE);
//!
//! assert!(perms.has_permissions(WRITE | DELETE));
//! assert!(!perms.has_all_permissions(WRITE | DELETE));
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

macro_rules! flag_set {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub const NONE: $name = $name(0);
            pub const ALL: $name = $name(u32::MAX);

            /// The flag with only bit `index` set.
            ///
            /// # Panics
            ///
            /// When `index` is 32 or more, in every build profile. In a
            /// `const` item this is a compile error.
            pub const fn bit(index: u32) -> Self {
                match Self::checked_bit(index) {
                    Some(flag) => flag,
                    None => panic!("flag index out of range (0..32)"),
                }
            }

            /// Like [`Self::bit`], `None` when `index` is 32 or more.
            pub const fn checked_bit(index: u32) -> Option<Self> {
                match 1u32.checked_shl(index) {
                    Some(bits) => Some($name(bits)),
                    None => None,
                }
            }

            pub const fn bits(self) -> u32 {
                self.0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }
        }

        impl BitOr for $name {
            type Output = $name;

            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: $name) {
                self.0 |= rhs.0;
            }
        }

        impl BitAnd for $name {
            type Output = $name;

            fn bitand(self, rhs: $name) -> $name {
                $name(self.0 & rhs.0)
            }
        }

        impl Not for $name {
            type Output = $name;

            fn not(self) -> $name {
                $name(!self.0)
            }
        }

        impl FromIterator<$name> for $name {
            fn from_iter<I: IntoIterator<Item = $name>>(iter: I) -> $name {
                iter.into_iter().fold($name::NONE, |acc, flag| acc | flag)
            }
        }
    };
}

flag_set!(
    /// A set of permission bits.
    Permission
);

flag_set!(
    /// A set of status bits.
    Status
);

pub const ALL_PERMISSIONS: Permission = Permission::ALL;
pub const ALL_STATUSES: Status = Status::ALL;

/// Permissions and statuses of one principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Permissions {
    permissions: Permission,
    statuses: Status,
}

impl Permissions {
    pub fn new(permissions: u32, statuses: u32) -> Self {
        Self {
            permissions: Permission(permissions),
            statuses: Status(statuses),
        }
    }

    pub fn permissions(&self) -> u32 {
        self.permissions.bits()
    }

    pub fn statuses(&self) -> u32 {
        self.statuses.bits()
    }

    /// True if any of `permissions` is set.
    pub fn has_permissions(&self, permissions: Permission) -> bool {
        !(self.permissions & permissions).is_empty()
    }

    /// True if every one of `permissions` is set.
    pub fn has_all_permissions(&self, permissions: Permission) -> bool {
        self.permissions & permissions == permissions
    }

    /// True if any of `statuses` is set.
    pub fn has_statuses(&self, statuses: Status) -> bool {
        !(self.statuses & statuses).is_empty()
    }

    pub fn add_permissions(&mut self, permissions: Permission) {
        self.permissions |= permissions;
    }

    pub fn add_statuses(&mut self, statuses: Status) {
        self.statuses |= statuses;
    }

    pub fn remove_permissions(&mut self, permissions: Permission) {
        self.permissions = self.permissions & !permissions;
    }

    pub fn remove_statuses(&mut self, statuses: Status) {
        self.statuses = self.statuses & !statuses;
    }
}
