//! Mission catalog joined with the account's progress

use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use super::{Mission, MissionKey, MissionRunner};
use crate::api::classify;
use crate::error::Result;

/// A mission and how far the account has got with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionProgress {
    pub mission: Mission,
    pub current: u32,
}

impl MissionProgress {
    pub fn is_complete(&self) -> bool {
        self.current >= self.mission.threshold
    }

    pub fn remaining(&self) -> u32 {
        self.mission.threshold.saturating_sub(self.current)
    }
}

/// Every declared mission with its progress, plus the account's point total
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionStatus {
    pub progress: Vec<MissionProgress>,
    pub total_points: i64,
}

#[derive(Debug, Deserialize)]
struct MissionsReply {
    data: MissionsData,
}

#[derive(Debug, Deserialize)]
struct MissionsData {
    missions: Vec<RawMission>,
}

#[derive(Debug, Deserialize)]
struct RawMission {
    points: i64,
    name: String,
    mission_key: String,
    threshold: u32,
}

impl From<RawMission> for Mission {
    fn from(raw: RawMission) -> Self {
        Mission {
            points: raw.points,
            name: raw.name,
            key: MissionKey::from_raw(&raw.mission_key),
            threshold: raw.threshold,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatesReply {
    data: StatesData,
}

#[derive(Debug, Deserialize)]
struct StatesData {
    total_points: i64,
    states: Vec<RawState>,
}

#[derive(Debug, Deserialize)]
struct RawState {
    mission_key: String,
    happened_times: u32,
}

/// Left-join progress onto the catalog by raw mission key; absent keys are 0
fn join_progress(missions: Vec<Mission>, states: &[RawState]) -> Vec<MissionProgress> {
    let by_key: HashMap<&str, u32> = states
        .iter()
        .map(|state| (state.mission_key.as_str(), state.happened_times))
        .collect();

    missions
        .into_iter()
        .map(|mission| {
            let current = by_key.get(mission.key.as_str()).copied().unwrap_or(0);
            MissionProgress { mission, current }
        })
        .collect()
}

impl MissionRunner<'_> {
    /// Fetch the missions the server currently declares
    pub async fn get_missions(&self) -> Result<Vec<Mission>> {
        let reply: MissionsReply = self
            .call("fetch missions", |f| f.missions(), classify)
            .await?;
        Ok(reply.data.missions.into_iter().map(Mission::from).collect())
    }

    /// Fetch catalog then progress and join them. A failure in either fetch
    /// fails the whole query.
    pub async fn get_missions_with_progress(&self) -> Result<MissionStatus> {
        let missions = self.get_missions().await?;
        let reply: StatesReply = self
            .call("fetch mission state", |f| f.missions_state(), classify)
            .await?;

        let progress = join_progress(missions, &reply.data.states);
        debug!(
            "{}: {} mission(s), {} complete, {} points",
            self.account().masked_phone(),
            progress.len(),
            progress.iter().filter(|p| p.is_complete()).count(),
            reply.data.total_points
        );

        Ok(MissionStatus {
            progress,
            total_points: reply.data.total_points,
        })
    }
}
