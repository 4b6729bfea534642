//! Newtype identifiers shared across every Vulcn crate.

use std::fmt;

use uuid::Uuid;

macro_rules! uuid_id {
    ($name:ident) => {
        #[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
        #[derive(Clone, Debug, Eq, PartialEq, Hash)]
        pub struct $name(pub String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(ScanId);
uuid_id!(SessionId);
uuid_id!(StepId);
uuid_id!(PayloadId);
uuid_id!(PluginId);
uuid_id!(FindingId);
uuid_id!(PageId);
