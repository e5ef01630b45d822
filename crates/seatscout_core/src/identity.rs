//! Login id to owner id resolution

use std::collections::HashMap;

use crate::id::{LoginId, OwnerId};
use crate::model::User;

/// Mapping from login-history identity to CRM owner identity.
///
/// Built once per run from the seat listing. Users without a login id are
/// left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityMap {
    login_to_owner: HashMap<LoginId, OwnerId>,
}

impl IdentityMap {
    pub fn from_users<'a>(users: impl IntoIterator<Item = &'a User>) -> Self {
        let login_to_owner = users
            .into_iter()
            .filter_map(|user| {
                user.login_id
                    .as_ref()
                    .map(|login| (login.clone(), user.owner_id.clone()))
            })
            .collect();
        Self { login_to_owner }
    }

    pub fn owner_for(&self, login_id: &LoginId) -> Option<&OwnerId> {
        self.login_to_owner.get(login_id)
    }

    /// Lookup by raw identifier, as found on engagement creator/modifier fields
    pub fn owner_for_raw(&self, login_id: &str) -> Option<&OwnerId> {
        self.login_to_owner.get(login_id)
    }

    pub fn len(&self) -> usize {
        self.login_to_owner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.login_to_owner.is_empty()
    }
}
