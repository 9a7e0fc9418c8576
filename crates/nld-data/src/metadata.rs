//! Session metadata table
//!
//! A single JSON object maps each session id to a flat record describing the
//! player and how far the game went.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Metadata of one recorded session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub alignment: String,
    /// Number of recorded timesteps.
    pub length: u64,
    pub max_dungeon_number: i32,
    pub min_dungeon_number: i32,
    pub max_experience_level: i32,
    pub min_experience_level: i32,
    pub max_experience_points: i64,
    pub min_experience_points: i64,
    pub max_dungeon_level: i32,
    pub min_dungeon_level: i32,
    /// Position of the player in the skill ranking used to select the corpus.
    pub rank: u32,
    pub role: String,
    /// Unix timestamp (seconds) of the start of the session.
    pub stamp: i64,
    pub username: String,
}

impl SessionMetadata {
    /// Start of the session, if the stamp is a representable time.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.stamp, 0)
    }

    /// Deepest dungeon level reached.
    pub fn depth_reached(&self) -> i32 {
        self.max_dungeon_level
    }

    /// Experience levels gained during the session.
    pub fn levels_gained(&self) -> i32 {
        self.max_experience_level - self.min_experience_level
    }
}

/// Session id to metadata, ordered by session id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataTable {
    sessions: BTreeMap<String, SessionMetadata>,
}

impl MetadataTable {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DataError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(BufReader::new(file))?;
        tracing::debug!(path = %path.display(), sessions = table.len(), "metadata loaded");
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn get(&self, session_id: &str) -> Option<&SessionMetadata> {
        self.sessions.get(session_id)
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SessionMetadata)> {
        self.sessions.iter().map(|(id, meta)| (id.as_str(), meta))
    }

    /// Distinct usernames, sorted.
    pub fn usernames(&self) -> Vec<&str> {
        self.sessions
            .values()
            .map(|meta| meta.username.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sessions recorded by `username`, ordered by session id.
    pub fn sessions_for_user<'a>(
        &'a self,
        username: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a SessionMetadata)> + 'a {
        self.iter().filter(move |(_, meta)| meta.username == username)
    }

    /// Total number of timesteps across all sessions.
    pub fn total_length(&self) -> u64 {
        self.sessions.values().map(|meta| meta.length).sum()
    }
}

impl FromIterator<(String, SessionMetadata)> for MetadataTable {
    fn from_iter<I: IntoIterator<Item = (String, SessionMetadata)>>(iter: I) -> Self {
        Self {
            sessions: iter.into_iter().collect(),
        }
    }
}
