//! The fixed administrator set.

use senatus_types::PlatformUserId;
use std::collections::HashSet;

/// Chat identities allowed to force links and delete other users' links.
#[derive(Clone, Debug, Default)]
pub struct AdminSet {
    ids: HashSet<PlatformUserId>,
}

impl AdminSet {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PlatformUserId>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, id: &PlatformUserId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
