//! Newtype wrappers around [`uuid::Uuid`] for all domain entity identifiers.
//!
//! Using distinct types prevents accidentally passing an `AthleteId` where
//! a `CoachId` is expected; the athlete/coach distinction carries real
//! authorization weight in this domain.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define a newtype ID wrapper around `Uuid`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Return the inner UUID value.
            pub fn into_uuid(self) -> Uuid {
                self.0
            }

            /// Return a reference to the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
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

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

define_id!(
    /// Unique identifier for a user (athlete or coach).
    UserId
);

define_id!(
    /// Unique identifier for an athlete, the owning side of a folder.
    AthleteId
);

define_id!(
    /// Unique identifier for a coach, the invited side of a folder.
    CoachId
);

define_id!(
    /// Unique identifier for a shared folder.
    FolderId
);

define_id!(
    /// Unique identifier for a coach invitation.
    InvitationId
);

define_id!(
    /// Unique identifier for an access revocation event.
    RevocationId
);

// Athlete and coach identifiers are user identifiers in the user directory.

impl From<AthleteId> for UserId {
    fn from(id: AthleteId) -> UserId {
        UserId(id.0)
    }
}

impl From<CoachId> for UserId {
    fn from(id: CoachId) -> UserId {
        UserId(id.0)
    }
}

impl From<UserId> for AthleteId {
    fn from(id: UserId) -> AthleteId {
        AthleteId(id.0)
    }
}

impl From<UserId> for CoachId {
    fn from(id: UserId) -> CoachId {
        CoachId(id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_athlete_id_new() {
        let id1 = AthleteId::new();
        let id2 = AthleteId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_folder_id_display() {
        let uuid = Uuid::new_v4();
        let id = FolderId::from_uuid(uuid);
        assert_eq!(id.to_string(), uuid.to_string());
    }

    #[test]
    fn test_coach_id_from_str() {
        let uuid = Uuid::new_v4();
        let id: CoachId = uuid.to_string().parse().expect("should parse");
        assert_eq!(id.0, uuid);
    }

    #[test]
    fn test_serde_roundtrip() {
        let id = InvitationId::new();
        let json = serde_json::to_string(&id).expect("serialize");
        let parsed: InvitationId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_user_id_conversions() {
        let coach = CoachId::new();
        let user: UserId = coach.into();
        assert_eq!(user.into_uuid(), coach.into_uuid());
    }
}
