//! Daily game-state broadcasts.
//!
//! Each `gameupdate` starts one loop for its (community, channel). The loop
//! posts once immediately, then once a day at the configured UTC time, until
//! the process exits. Loops are not persisted across restarts.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use chrono::{NaiveTime, Utc};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use senatus_game::GameClient;
use senatus_platform::ChatPlatform;
use senatus_types::{ChannelId, CommunityId, RoleId};
use senatus_utils::{format_duration, next_run_after};

use crate::reply::game_update_message;
use crate::BotError;

type BroadcastKey = (CommunityId, ChannelId);

/// Live broadcast loops, at most one per (community, channel).
#[derive(Default)]
pub struct BroadcastRegistry {
    loops: Mutex<HashMap<BroadcastKey, JoinHandle<()>>>,
}

impl BroadcastRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `task` for the key unless a loop for it is still running.
    ///
    /// Returns `false` (and drops `task`) if one is.
    pub fn start<F>(&self, community: &CommunityId, channel: &ChannelId, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut loops = self.loops.lock().unwrap_or_else(|e| e.into_inner());
        loops.retain(|_, handle| !handle.is_finished());
        let key = (community.clone(), channel.clone());
        if loops.contains_key(&key) {
            return false;
        }
        loops.insert(key, tokio::spawn(task));
        true
    }

    pub fn is_running(&self, community: &CommunityId, channel: &ChannelId) -> bool {
        let loops = self.loops.lock().unwrap_or_else(|e| e.into_inner());
        loops
            .get(&(community.clone(), channel.clone()))
            .is_some_and(|h| !h.is_finished())
    }

    /// Number of live loops, pruning finished ones.
    pub fn active(&self) -> usize {
        let mut loops = self.loops.lock().unwrap_or_else(|e| e.into_inner());
        loops.retain(|_, handle| !handle.is_finished());
        loops.len()
    }

    /// Abort every loop.
    pub fn stop_all(&self) {
        let mut loops = self.loops.lock().unwrap_or_else(|e| e.into_inner());
        for (_, handle) in loops.drain() {
            handle.abort();
        }
    }
}

/// One channel's daily update loop.
pub struct Broadcaster {
    pub game: Arc<dyn GameClient>,
    pub platform: Arc<dyn ChatPlatform>,
    pub channel: ChannelId,
    pub ping_role: Option<RoleId>,
    pub ping_on_first_run: bool,
    pub at: NaiveTime,
    pub game_name: String,
}

impl Broadcaster {
    /// Fetch the game state and post it.
    pub async fn post_once(&self, ping: bool) -> Result<(), BotError> {
        let state = self.game.fetch_game_state().await?;
        let role = if ping { self.ping_role.as_ref() } else { None };
        let message = game_update_message(&state, &self.game_name, role);
        self.platform.send_message(&self.channel, &message).await?;
        Ok(())
    }

    /// Post now, then daily at `at` until `shutdown` fires.
    ///
    /// A failed post is logged and the loop carries on to the next day.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if let Err(e) = self.post_once(self.ping_on_first_run).await {
            tracing::warn!(channel = %self.channel, error = %e, "initial game update failed");
        }

        loop {
            let now = Utc::now();
            let next = next_run_after(now, self.at);
            let wait = (next - now).to_std().unwrap_or_default();
            tracing::debug!(
                channel = %self.channel,
                next = %next,
                wait = %format_duration(wait.as_secs()),
                "next game update scheduled"
            );

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = shutdown.recv() => {
                    tracing::debug!(channel = %self.channel, "game update loop stopping");
                    return;
                }
            }

            match self.post_once(true).await {
                Ok(()) => tracing::info!(channel = %self.channel, "game update posted"),
                Err(e) => tracing::warn!(channel = %self.channel, error = %e, "game update failed"),
            }
        }
    }
}
