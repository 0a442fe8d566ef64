use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Roles a user can hold within the federation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Role {
    /// Federation-level administrator.
    #[serde(rename = "admin_asambal")]
    FederationAdmin,
    /// Administrator of a single club.
    #[serde(rename = "admin_club")]
    ClubAdmin,
    /// Coach attached to one or more clubs.
    #[serde(rename = "profesor")]
    Coach,
    /// Player attached to one or more clubs.
    #[serde(rename = "jugador")]
    Player,
}

impl Role {
    /// The string this role is stored and transmitted as.
    pub fn wire_name(self) -> &'static str {
        match self {
            Role::FederationAdmin => "admin_asambal",
            Role::ClubAdmin => "admin_club",
            Role::Coach => "profesor",
            Role::Player => "jugador",
        }
    }

    fn from_wire(value: &str) -> Option<Self> {
        match value {
            "admin_asambal" => Some(Role::FederationAdmin),
            "admin_club" => Some(Role::ClubAdmin),
            "profesor" => Some(Role::Coach),
            "jugador" => Some(Role::Player),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Set of roles held by a user.
///
/// Historical documents stored roles as a single string, an array or an
/// object keyed by index. This type is the only place those shapes are
/// interpreted: deserialization always normalizes into a proper set and
/// serialization always emits an array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    /// Empty role set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set holding exactly one role.
    pub fn single(role: Role) -> Self {
        let mut set = BTreeSet::new();
        set.insert(role);
        Self(set)
    }

    /// Whether the set contains `role`.
    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// Whether the set holds any administrator role.
    pub fn has_admin(&self) -> bool {
        self.contains(Role::FederationAdmin) || self.contains(Role::ClubAdmin)
    }

    /// Add a role; returns `false` when it was already present.
    pub fn insert(&mut self, role: Role) -> bool {
        self.0.insert(role)
    }

    /// Iterate over the contained roles.
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    /// Normalize any of the historical role shapes into a set, silently
    /// dropping unknown names.
    pub fn normalize(value: &Value) -> Self {
        let mut set = BTreeSet::new();

        match value {
            Value::String(name) => {
                if let Some(role) = Role::from_wire(name) {
                    set.insert(role);
                }
            }
            Value::Array(entries) => {
                for entry in entries {
                    if let Some(role) = entry.as_str().and_then(Role::from_wire) {
                        set.insert(role);
                    }
                }
            }
            Value::Object(map) => {
                for entry in map.values() {
                    if let Some(role) = entry.as_str().and_then(Role::from_wire) {
                        set.insert(role);
                    }
                }
            }
            _ => {}
        }

        Self(set)
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for RoleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl<'de> Deserialize<'de> for RoleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::normalize(&value))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn normalizes_single_string() {
        let roles = RoleSet::normalize(&json!("jugador"));
        assert!(roles.contains(Role::Player));
        assert!(!roles.has_admin());
    }

    #[test]
    fn normalizes_array_shape() {
        let roles = RoleSet::normalize(&json!(["profesor", "jugador"]));
        assert!(roles.contains(Role::Coach));
        assert!(roles.contains(Role::Player));
    }

    #[test]
    fn normalizes_legacy_map_shape() {
        let roles = RoleSet::normalize(&json!({"0": "admin_club", "1": "profesor"}));
        assert!(roles.contains(Role::ClubAdmin));
        assert!(roles.has_admin());
    }

    #[test]
    fn unknown_names_are_dropped() {
        let roles = RoleSet::normalize(&json!(["arbitro", "jugador"]));
        assert_eq!(roles.iter().collect::<Vec<_>>(), vec![Role::Player]);
    }

    #[test]
    fn serializes_as_array() {
        let roles: RoleSet = [Role::Coach, Role::Player].into_iter().collect();
        assert_eq!(
            serde_json::to_value(&roles).unwrap(),
            json!(["profesor", "jugador"])
        );
    }
}
