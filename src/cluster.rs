//! Cluster forcing for bounded-latency live output.
//!
//! A segment writer only emits a cluster once it is closed, so a live
//! receiver cannot render anything still sitting in the open cluster. With
//! video, clusters are normally cut at keyframes, which may be seconds
//! apart. The policy forces a cut when the delegate has been silent for
//! longer than the configured interval.
//!
//! The clock is wall time since the last delegate write, not media time:
//! what matters is how long the receiver has been waiting.

use std::time::Duration;

/// Lower bound on the forced interval; at most 10 forced clusters per
/// second.
pub const MIN_FORCED_CLUSTER_INTERVAL: Duration = Duration::from_millis(100);

/// Decides whether the next written frame must open a new cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterPolicy {
    /// `None` disables forcing.
    interval: Option<Duration>,
}

impl ClusterPolicy {
    /// Build the policy for a muxer.
    ///
    /// Forcing is disabled for audio-only recordings (every audio frame is
    /// a keyframe and clusters are cut often enough) and when `interval` is
    /// `None` or zero. Other intervals are raised to
    /// [`MIN_FORCED_CLUSTER_INTERVAL`].
    pub fn new(has_video: bool, interval: Option<Duration>) -> Self {
        let interval = interval
            .filter(|i| has_video && !i.is_zero())
            .map(|i| i.max(MIN_FORCED_CLUSTER_INTERVAL));
        Self { interval }
    }

    /// The effective interval, after clamping.
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// `since_last_output` is `None` when the delegate has not written yet;
    /// nothing is held back then, so the policy does not fire.
    pub fn should_force(&self, since_last_output: Option<Duration>) -> bool {
        match (self.interval, since_last_output) {
            (Some(interval), Some(elapsed)) => elapsed >= interval,
            _ => false,
        }
    }
}
