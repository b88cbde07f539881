//! Opaque resource tokens issued by the native module
//!
//! Each resource kind gets its own newtype so a wallet token can never be
//! passed where a client token is expected. Tokens are never dereferenced on
//! this side; zero is the null token.

use std::fmt;

/// The families of native resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Client,
    Wallet,
    SecretManager,
    /// Stateless utility calls; no token
    Utils,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::Client => "client",
            ResourceKind::Wallet => "wallet",
            ResourceKind::SecretManager => "secret manager",
            ResourceKind::Utils => "utils",
        })
    }
}

macro_rules! resource_ptr {
    ($(#[$meta:meta])* $name:ident => $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            pub const NULL: Self = Self(0);
            pub const KIND: ResourceKind = $kind;

            /// Wrap a raw token
            ///
            /// # Safety
            ///
            /// `raw` must be zero or a live token of this kind issued by the
            /// loaded native module; the native side dereferences it.
            pub const unsafe fn from_raw(raw: usize) -> Self {
                Self(raw)
            }

            pub const fn as_raw(self) -> usize {
                self.0
            }

            pub const fn is_null(self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}@{:#x}", Self::KIND, self.0)
            }
        }
    };
}

resource_ptr!(
    /// Token for a native node client
    ClientPtr => ResourceKind::Client
);
resource_ptr!(
    /// Token for a native wallet
    WalletPtr => ResourceKind::Wallet
);
resource_ptr!(
    /// Token for a native secret manager
    SecretManagerPtr => ResourceKind::SecretManager
);
