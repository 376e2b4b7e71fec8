//! Serializable scene state with a content hash.
//!
//! A [`SceneSnapshot`] records every body's role and transform at a tick, plus
//! a BLAKE3 hash of that data. Two runs with the same seed and config must
//! produce equal hashes tick for tick; headless runs can also dump the final
//! snapshot as JSON for inspection.
//!
//! Snapshots are one-way: the rapier world is not rebuilt from them.

use serde::{Deserialize, Serialize};

use crate::physics::{BodyId, BodyTransform};
use crate::scene::{BodyRole, Scene};

/// Errors produced while encoding or decoding snapshots.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One body at the moment of capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub id: BodyId,
    pub role: BodyRole,
    pub transform: BodyTransform,
}

/// Scene state at a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub seed: u64,
    pub tick: u64,
    pub sim_time: f64,
    pub spawned_total: u64,
    pub culled_total: u64,
    pub bodies: Vec<BodySnapshot>,
    /// BLAKE3 hex digest of every other field.
    pub hash: String,
}

impl SceneSnapshot {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON.
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Recompute the hash and compare it with the stored one.
    pub fn verify(&self) -> Result<bool, SnapshotError> {
        let expected = compute_hash(
            self.seed,
            self.tick,
            self.spawned_total,
            self.culled_total,
            &self.bodies,
        )?;
        Ok(expected == self.hash)
    }
}

fn compute_hash(
    seed: u64,
    tick: u64,
    spawned_total: u64,
    culled_total: u64,
    bodies: &[BodySnapshot],
) -> Result<String, SnapshotError> {
    #[derive(Serialize)]
    struct Hashable<'a> {
        seed: u64,
        tick: u64,
        spawned_total: u64,
        culled_total: u64,
        bodies: &'a [BodySnapshot],
    }

    let bytes = serde_json::to_vec(&Hashable {
        seed,
        tick,
        spawned_total,
        culled_total,
        bodies,
    })?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

impl Scene {
    /// Capture the current state of every body.
    pub fn snapshot(&self) -> Result<SceneSnapshot, SnapshotError> {
        let bodies: Vec<BodySnapshot> = self
            .roles()
            .filter_map(|(id, role)| {
                Some(BodySnapshot {
                    id,
                    role,
                    transform: self.physics().transform(id)?,
                })
            })
            .collect();
        let hash = compute_hash(
            self.seed(),
            self.tick_count(),
            self.spawned_total(),
            self.culled_total(),
            &bodies,
        )?;
        Ok(SceneSnapshot {
            seed: self.seed(),
            tick: self.tick_count(),
            sim_time: self.sim_time(),
            spawned_total: self.spawned_total(),
            culled_total: self.culled_total(),
            bodies,
            hash,
        })
    }
}
