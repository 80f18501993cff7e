//! Mission actions
//!
//! Read and like share one loop: walk the candidate posts, skip posts the
//! server no longer has, refetch when the list runs out, and stop with
//! `Exhausted` as soon as a fetch comes back empty or a full pass makes no
//! progress. Share deliberately looks at the first candidate only.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{MissionKey, MissionRunner};
use crate::api::{classify, RawResponse};
use crate::error::{CallError, MissionError, Result};
use crate::game::Game;

/// Message the server returns for a deleted or hidden post
pub const POST_NOT_FOUND: &str = "帖子不存在";

/// Message the server returns for an accepted like or share
pub const SUCCESS_MESSAGE: &str = "OK";

/// Successful result of one action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Sign-in accepted; the server's updated point total
    SignedIn { points: i64 },
    /// Target number of post interactions reached
    Completed { interactions: u32 },
}

/// Result of one mission inside [`MissionRunner::run_pending`]
#[derive(Debug)]
pub struct MissionRun {
    pub key: MissionKey,
    pub result: Result<ActionOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PostAction {
    Read,
    Like,
}

impl PostAction {
    fn context(self) -> &'static str {
        match self {
            PostAction::Read => "read",
            PostAction::Like => "like",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PostVisit {
    Counted,
    NotFound,
}

#[derive(Debug, Deserialize)]
struct SignReply {
    data: SignData,
}

#[derive(Debug, Deserialize)]
struct SignData {
    points: i64,
}

#[derive(Debug, Deserialize)]
struct MessageReply {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PostFullReply {
    message: String,
    #[serde(default)]
    data: Option<PostFullData>,
}

#[derive(Debug, Deserialize)]
struct PostFullData {
    post: PostFull,
}

#[derive(Debug, Deserialize)]
struct PostFull {
    #[serde(default)]
    self_operation: Option<Value>,
}

fn malformed(response: &RawResponse, reason: impl Into<String>) -> CallError {
    CallError::Malformed {
        reason: reason.into(),
        body: response.body.clone(),
    }
}

fn parse_post_full(response: &RawResponse) -> std::result::Result<PostVisit, CallError> {
    let reply: PostFullReply = classify(response)?;
    if reply.message == POST_NOT_FOUND {
        return Ok(PostVisit::NotFound);
    }
    match reply.data {
        Some(PostFullData {
            post: PostFull {
                self_operation: Some(_),
            },
        }) => Ok(PostVisit::Counted),
        _ => Err(malformed(response, "post has no self_operation block")),
    }
}

fn parse_upvote(response: &RawResponse) -> std::result::Result<PostVisit, CallError> {
    let reply: MessageReply = classify(response)?;
    match reply.message.as_str() {
        SUCCESS_MESSAGE => Ok(PostVisit::Counted),
        POST_NOT_FOUND => Ok(PostVisit::NotFound),
        other => Err(malformed(response, format!("like rejected: {other}"))),
    }
}

fn parse_share(response: &RawResponse) -> std::result::Result<(), CallError> {
    let reply: MessageReply = classify(response)?;
    if reply.message == SUCCESS_MESSAGE {
        Ok(())
    } else {
        Err(malformed(response, format!("share rejected: {}", reply.message)))
    }
}

impl MissionRunner<'_> {
    /// Daily forum sign-in; returns the updated point total
    pub async fn sign(&self, game: Game) -> Result<i64> {
        let points = self
            .call(
                "sign",
                |f| f.sign_in(game),
                |r| classify::<SignReply>(r).map(|reply| reply.data.points),
            )
            .await?;
        info!(
            "{} signed in to {} forum, points: {}",
            self.account().masked_phone(),
            game,
            points
        );
        Ok(points)
    }

    /// Read `times` posts; returns the number of posts read
    pub async fn read(&self, game: Game, times: u32) -> Result<u32> {
        self.interact(game, PostAction::Read, times).await
    }

    /// Like `times` posts; returns the number of posts liked
    pub async fn like(&self, game: Game, times: u32) -> Result<u32> {
        self.interact(game, PostAction::Like, times).await
    }

    /// Share the first candidate post
    pub async fn share(&self, game: Game) -> Result<()> {
        let candidates = self.fetch_candidates(game).await?;
        let Some(first) = candidates.first() else {
            warn!("No candidate post to share in {} forum", game);
            return Err(MissionError::Exhausted {
                completed: 0,
                target: 1,
            });
        };

        let post_id = first.post_id.as_str();
        self.call("share", |f| f.share_conf(post_id), parse_share)
            .await?;
        info!("{} shared post {}", self.account().masked_phone(), post_id);
        Ok(())
    }

    /// Execute the action behind `key` with the configured targets
    pub async fn run_mission(&self, key: &MissionKey, game: Game) -> Result<ActionOutcome> {
        let config = self.config();
        self.run_mission_with_target(key, game, config.read_times, config.like_times)
            .await
    }

    /// Run every executable, unfinished mission in catalog order.
    ///
    /// Read and like target the remaining count. An expired session or a
    /// cancellation ends the sequence; other failures are recorded and the
    /// next mission still runs.
    pub async fn run_pending(&self, game: Game) -> Result<Vec<MissionRun>> {
        let status = self.get_missions_with_progress().await?;
        let mut runs = Vec::new();

        for entry in status.progress.iter().filter(|p| !p.is_complete()) {
            let key = &entry.mission.key;
            if !key.is_executable() {
                debug!("Skipping unclassified mission {}", key);
                continue;
            }

            let remaining = entry.remaining();
            let result = self
                .run_mission_with_target(key, game, remaining, remaining)
                .await;
            let stop = matches!(&result, Err(e) if e.is_fatal_for_account());
            runs.push(MissionRun {
                key: key.clone(),
                result,
            });
            if stop {
                break;
            }
        }

        Ok(runs)
    }

    async fn run_mission_with_target(
        &self,
        key: &MissionKey,
        game: Game,
        read_times: u32,
        like_times: u32,
    ) -> Result<ActionOutcome> {
        match key {
            MissionKey::Sign => self
                .sign(game)
                .await
                .map(|points| ActionOutcome::SignedIn { points }),
            MissionKey::Read => self
                .read(game, read_times)
                .await
                .map(|interactions| ActionOutcome::Completed { interactions }),
            MissionKey::Like => self
                .like(game, like_times)
                .await
                .map(|interactions| ActionOutcome::Completed { interactions }),
            MissionKey::Share => self
                .share(game)
                .await
                .map(|()| ActionOutcome::Completed { interactions: 1 }),
            MissionKey::Unclassified(_) => Err(MissionError::unsupported(key)),
        }
    }

    async fn interact(&self, game: Game, action: PostAction, target: u32) -> Result<u32> {
        let mut completed = 0;
        if target == 0 {
            return Ok(completed);
        }

        loop {
            let candidates = self.fetch_candidates(game).await?;
            if candidates.is_empty() {
                warn!(
                    "{}: no more candidate posts in {} forum ({}/{})",
                    action.context(),
                    game,
                    completed,
                    target
                );
                return Err(MissionError::Exhausted { completed, target });
            }

            let before = completed;
            for candidate in &candidates {
                if completed >= target {
                    break;
                }
                match self.visit(action, &candidate.post_id).await? {
                    PostVisit::Counted => completed += 1,
                    PostVisit::NotFound => {
                        debug!(
                            "{}: post {} no longer exists",
                            action.context(),
                            candidate.post_id
                        );
                    }
                }
                if completed < target {
                    self.pace().await?;
                }
            }

            if completed >= target {
                info!(
                    "{} finished {} in {} forum: {} post(s)",
                    self.account().masked_phone(),
                    action.context(),
                    game,
                    completed
                );
                return Ok(completed);
            }
            if completed == before {
                warn!(
                    "{}: a full pass over {} post(s) made no progress",
                    action.context(),
                    candidates.len()
                );
                return Err(MissionError::Exhausted { completed, target });
            }
        }
    }

    async fn visit(&self, action: PostAction, post_id: &str) -> Result<PostVisit> {
        match action {
            PostAction::Read => {
                self.call(action.context(), |f| f.post_full(post_id), parse_post_full)
                    .await
            }
            PostAction::Like => {
                self.call(action.context(), |f| f.upvote(post_id), parse_upvote)
                    .await
            }
        }
    }
}
