//! Flat record of a finished series, handed to exporters.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::flow::SeriesLength;
use crate::domain::snapshot::{slot_views, SlotView};
use crate::domain::state::{MapScore, MapStatus, MatchState, Owner, TeamSlot};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub match_id: String,
    pub exported_at: String,
    pub series: Option<SeriesLength>,
    pub team_a: String,
    pub team_b: String,
    /// `"HP Den"` style labels, per banning team.
    pub bans: BTreeMap<TeamSlot, Vec<String>>,
    pub maps: Vec<SummaryMap>,
    pub wins: BTreeMap<TeamSlot, u8>,
    pub winner: Option<TeamSlot>,
    pub winner_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMap {
    #[serde(flatten)]
    pub view: SlotView,
    pub winner: Option<TeamSlot>,
    pub score: Option<MapScore>,
}

pub fn summarize(state: &MatchState, exported_at: String) -> MatchSummary {
    let mut bans: BTreeMap<TeamSlot, Vec<String>> =
        TeamSlot::BOTH.into_iter().map(|t| (t, Vec::new())).collect();
    for entry in state.maps.values() {
        if let (MapStatus::Banned, Some(Owner::Team(team))) = (entry.status, entry.owner) {
            bans.entry(team)
                .or_default()
                .push(format!("{} {}", entry.mode, entry.name));
        }
    }

    let maps = slot_views(state)
        .into_iter()
        .map(|view| {
            let result = state.results.iter().find(|r| r.slot == view.slot);
            SummaryMap {
                winner: result.map(|r| r.winner),
                score: result.and_then(|r| r.score),
                view,
            }
        })
        .collect();

    MatchSummary {
        match_id: state.match_id.to_string(),
        exported_at,
        series: state.series,
        team_a: state.team(TeamSlot::A).name.clone(),
        team_b: state.team(TeamSlot::B).name.clone(),
        bans,
        maps,
        wins: TeamSlot::BOTH
            .into_iter()
            .map(|t| (t, state.wins(t)))
            .collect(),
        winner: state.series_winner,
        winner_name: state.series_winner.map(|t| state.team(t).name.clone()),
    }
}
