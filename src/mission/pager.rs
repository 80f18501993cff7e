//! Candidate posts for read, like and share

use serde::Deserialize;
use tracing::debug;

use super::MissionRunner;
use crate::api::classify;
use crate::error::Result;
use crate::game::Game;

/// A forum post the account has not acted on yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCandidate {
    pub post_id: String,
}

#[derive(Debug, Deserialize)]
struct PostListReply {
    data: PostListData,
}

#[derive(Debug, Deserialize)]
struct PostListData {
    list: Vec<PostEntry>,
}

#[derive(Debug, Deserialize)]
struct PostEntry {
    self_operation: SelfOperation,
    post: PostRef,
}

#[derive(Debug, Deserialize)]
struct SelfOperation {
    attitude: i64,
}

#[derive(Debug, Deserialize)]
struct PostRef {
    post_id: String,
}

impl MissionRunner<'_> {
    /// Fetch one page of the game's forum and keep the posts without an
    /// attitude marker. An empty result is not an error.
    pub async fn fetch_candidates(&self, game: Game) -> Result<Vec<PostCandidate>> {
        let reply: PostListReply = self
            .call("fetch posts", |f| f.post_list(game), classify)
            .await?;

        let total = reply.data.list.len();
        let candidates: Vec<PostCandidate> = reply
            .data
            .list
            .into_iter()
            .filter(|entry| entry.self_operation.attitude == 0)
            .map(|entry| PostCandidate {
                post_id: entry.post.post_id,
            })
            .collect();

        debug!(
            "{} forum: {} of {} posts are candidates",
            game,
            candidates.len(),
            total
        );
        Ok(candidates)
    }
}
