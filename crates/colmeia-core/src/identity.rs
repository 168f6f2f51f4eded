use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The user a request or command runs as.
///
/// Produced by the web layer from the incoming request. Carries only data
/// and permission checks, no authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Actor {
    pub user_id: String,
    pub username: String,
    pub is_superuser: bool,
    pub is_staff: bool,
    /// Codenames in `<app_label>.<action>_<model_name>` form.
    pub permissions: BTreeSet<String>,
}

impl Actor {
    /// Whether the actor holds `codename`. Superusers hold every permission.
    #[must_use]
    pub fn has_perm(&self, codename: &str) -> bool {
        self.is_superuser || self.permissions.contains(codename)
    }

    /// Whether the actor holds any permission within `app_label`.
    #[must_use]
    pub fn has_module_perms(&self, app_label: &str) -> bool {
        self.is_superuser
            || self.permissions.iter().any(|codename| {
                codename
                    .split_once('.')
                    .is_some_and(|(app, _)| app == app_label)
            })
    }

    /// Owner id to scope queries by, or `None` when the actor sees everything.
    #[must_use]
    pub fn owner_scope(&self) -> Option<&str> {
        if self.is_superuser {
            None
        } else {
            Some(&self.user_id)
        }
    }

    /// Whether a record owned by `owner_id` is visible to this actor.
    #[must_use]
    pub fn can_see_owner(&self, owner_id: &str) -> bool {
        self.is_superuser || self.user_id == owner_id
    }
}
