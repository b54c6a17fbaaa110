//! Nullable game client: canned users, parties and game state.

use async_trait::async_trait;
use senatus_game::{GameClient, GameError, GameParty, GameState, GameUser};
use senatus_types::{ExternalAccountId, PartyId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// A game API double whose records are set up by the test.
///
/// Unknown ids answer [`GameError::NotFound`]; `set_offline(true)` makes every
/// call fail with [`GameError::Unreachable`].
pub struct NullGameClient {
    users: Mutex<HashMap<ExternalAccountId, GameUser>>,
    parties: Mutex<HashMap<PartyId, GameParty>>,
    state: Mutex<Option<GameState>>,
    offline: AtomicBool,
    party_fetches: AtomicUsize,
}

impl NullGameClient {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            parties: Mutex::new(HashMap::new()),
            state: Mutex::new(None),
            offline: AtomicBool::new(false),
            party_fetches: AtomicUsize::new(0),
        }
    }

    /// Insert a user with the given bio, party and job.
    pub fn add_user(&self, id: &str, bio: &str, party: Option<&str>, job: Option<&str>) {
        let user = GameUser {
            id: ExternalAccountId::new(id),
            username: format!("user{id}"),
            bio: bio.to_string(),
            party_id: party.map(PartyId::new),
            job: job.map(str::to_string),
            created_at: "2025-01-01".to_string(),
        };
        self.users.lock().unwrap().insert(user.id.clone(), user);
    }

    /// Replace a user's biography (as if they edited their profile).
    pub fn set_bio(&self, id: &str, bio: &str) {
        if let Some(user) = self
            .users
            .lock()
            .unwrap()
            .get_mut(&ExternalAccountId::new(id))
        {
            user.bio = bio.to_string();
        }
    }

    pub fn set_party(&self, id: &str, party: Option<&str>) {
        if let Some(user) = self
            .users
            .lock()
            .unwrap()
            .get_mut(&ExternalAccountId::new(id))
        {
            user.party_id = party.map(PartyId::new);
        }
    }

    pub fn set_job(&self, id: &str, job: Option<&str>) {
        if let Some(user) = self
            .users
            .lock()
            .unwrap()
            .get_mut(&ExternalAccountId::new(id))
        {
            user.job = job.map(str::to_string);
        }
    }

    pub fn add_party(&self, id: &str, name: &str, color: &str) {
        let party = GameParty {
            id: PartyId::new(id),
            name: name.to_string(),
            color: color.to_string(),
        };
        self.parties.lock().unwrap().insert(party.id.clone(), party);
    }

    pub fn set_game_state(&self, state: GameState) {
        *self.state.lock().unwrap() = Some(state);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// How many times party metadata was requested.
    pub fn party_fetches(&self) -> usize {
        self.party_fetches.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), GameError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(GameError::Unreachable("null game client is offline".into()));
        }
        Ok(())
    }
}

impl Default for NullGameClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GameClient for NullGameClient {
    async fn fetch_user(&self, id: &ExternalAccountId) -> Result<GameUser, GameError> {
        self.check_online()?;
        self.users
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| GameError::NotFound(format!("user {id}")))
    }

    async fn fetch_party(&self, id: &PartyId) -> Result<GameParty, GameError> {
        self.check_online()?;
        self.party_fetches.fetch_add(1, Ordering::SeqCst);
        self.parties
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| GameError::NotFound(format!("party {id}")))
    }

    async fn fetch_game_state(&self) -> Result<GameState, GameError> {
        self.check_online()?;
        self.state
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| GameError::NotFound("game state".into()))
    }
}
