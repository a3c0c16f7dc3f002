//! Lossy network simulation
//!
//! One [`ChaosLink`] models a one-way path between two peers:
//! - Latency with uniform jitter
//! - Random and burst loss
//! - Reordering
//! - Duplication
//!
//! Every link is driven by a seeded `StdRng`, so a run is reproducible.

use std::time::Duration;

use bytes::Bytes;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Link behaviour
#[derive(Clone, Debug, PartialEq)]
pub struct ChaosConfig {
    /// Base one-way latency
    pub latency: Duration,
    /// Extra latency drawn uniformly from `0..=jitter`
    pub jitter: Duration,
    /// Probability of losing a single frame (0.0 - 1.0)
    pub loss_rate: f64,
    /// Probability that a frame starts a loss burst
    pub burst_loss_prob: f64,
    /// Frames lost per burst, inclusive range
    pub burst_length: (u32, u32),
    /// Probability that a frame overtakes frames already in flight
    pub reorder_prob: f64,
    /// How many in-flight frames it may overtake
    pub reorder_depth: usize,
    pub duplicate_prob: f64,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        ChaosConfig {
            latency: Duration::from_millis(40),
            jitter: Duration::from_millis(20),
            loss_rate: 0.02,
            burst_loss_prob: 0.01,
            burst_length: (2, 4),
            reorder_prob: 0.05,
            reorder_depth: 3,
            duplicate_prob: 0.01,
        }
    }
}

impl ChaosConfig {
    /// Zero latency, nothing lost, nothing reordered
    pub fn perfect() -> Self {
        ChaosConfig {
            latency: Duration::ZERO,
            jitter: Duration::ZERO,
            loss_rate: 0.0,
            burst_loss_prob: 0.0,
            burst_length: (0, 0),
            reorder_prob: 0.0,
            reorder_depth: 0,
            duplicate_prob: 0.0,
        }
    }

    /// Drops everything
    pub fn blackout() -> Self {
        ChaosConfig {
            loss_rate: 1.0,
            ..Self::perfect()
        }
    }

    /// Independent loss only, no bursts
    pub fn lossy(loss_rate: f64) -> Self {
        ChaosConfig {
            latency: Duration::from_millis(30),
            jitter: Duration::from_millis(20),
            loss_rate,
            burst_loss_prob: 0.0,
            burst_length: (0, 0),
            reorder_prob: 0.05,
            reorder_depth: 2,
            duplicate_prob: 0.02,
        }
    }

    /// Mobile-class conditions with bursty loss
    pub fn hostile() -> Self {
        ChaosConfig {
            latency: Duration::from_millis(150),
            jitter: Duration::from_millis(100),
            loss_rate: 0.15,
            burst_loss_prob: 0.05,
            burst_length: (3, 8),
            reorder_prob: 0.2,
            reorder_depth: 6,
            duplicate_prob: 0.05,
        }
    }
}

/// Frame in flight
#[derive(Clone, Debug)]
struct InFlight {
    frame: Bytes,
    deliver_at: Duration,
    sent_at: Duration,
}

#[derive(Clone, Debug, Default)]
pub struct ChaosStats {
    pub frames_sent: u64,
    pub frames_delivered: u64,
    pub frames_lost: u64,
    pub frames_reordered: u64,
    pub frames_duplicated: u64,
    pub total_latency_ms: u64,
    pub max_latency_ms: u64,
}

impl ChaosStats {
    pub fn loss_rate(&self) -> f64 {
        if self.frames_sent == 0 {
            0.0
        } else {
            self.frames_lost as f64 / self.frames_sent as f64
        }
    }

    pub fn avg_latency_ms(&self) -> f64 {
        if self.frames_delivered == 0 {
            0.0
        } else {
            self.total_latency_ms as f64 / self.frames_delivered as f64
        }
    }
}

/// One-way simulated link
pub struct ChaosLink {
    config: ChaosConfig,
    rng: StdRng,
    in_flight: Vec<InFlight>,
    now: Duration,
    burst_remaining: u32,
    stats: ChaosStats,
}

impl ChaosLink {
    pub fn new(config: ChaosConfig, seed: u64) -> Self {
        ChaosLink {
            config,
            rng: StdRng::seed_from_u64(seed),
            in_flight: Vec::new(),
            now: Duration::ZERO,
            burst_remaining: 0,
            stats: ChaosStats::default(),
        }
    }

    /// Swap the link's behaviour; frames already in flight keep their schedule
    pub fn set_config(&mut self, config: ChaosConfig) {
        self.config = config;
        self.burst_remaining = 0;
    }

    pub fn config(&self) -> &ChaosConfig {
        &self.config
    }

    /// Put a frame on the wire
    pub fn send(&mut self, frame: Bytes) {
        self.stats.frames_sent += 1;

        if self.should_drop() {
            self.stats.frames_lost += 1;
            return;
        }

        let deliver_at = self.now + self.config.latency + self.sample_jitter();
        let packet = InFlight {
            frame: frame.clone(),
            deliver_at,
            sent_at: self.now,
        };

        let depth = self.config.reorder_depth.min(self.in_flight.len());
        if depth > 0 && self.rng.gen_bool(self.config.reorder_prob.clamp(0.0, 1.0)) {
            let overtake = self.rng.gen_range(1..=depth);
            let at = self.in_flight.len() - overtake;
            // Overtaking means arriving no later than the frame it jumps
            let packet = InFlight {
                deliver_at: packet.deliver_at.min(self.in_flight[at].deliver_at),
                ..packet
            };
            self.in_flight.insert(at, packet);
            self.stats.frames_reordered += 1;
        } else {
            self.in_flight.push(packet);
        }

        if self.rng.gen_bool(self.config.duplicate_prob.clamp(0.0, 1.0)) {
            let copy = InFlight {
                frame,
                deliver_at: deliver_at + self.sample_jitter(),
                sent_at: self.now,
            };
            self.in_flight.push(copy);
            self.stats.frames_duplicated += 1;
        }
    }

    fn should_drop(&mut self) -> bool {
        if self.burst_remaining > 0 {
            self.burst_remaining -= 1;
            return true;
        }

        if self.config.burst_loss_prob > 0.0
            && self.rng.gen_bool(self.config.burst_loss_prob.clamp(0.0, 1.0))
        {
            let (min, max) = self.config.burst_length;
            // This frame is the first of the burst
            self.burst_remaining = self.rng.gen_range(min..=max.max(min)).saturating_sub(1);
            return true;
        }

        self.rng.gen_bool(self.config.loss_rate.clamp(0.0, 1.0))
    }

    fn sample_jitter(&mut self) -> Duration {
        if self.config.jitter.is_zero() {
            return Duration::ZERO;
        }
        let max = self.config.jitter.as_micros() as u64;
        Duration::from_micros(self.rng.gen_range(0..=max))
    }

    /// Advance the clock and take every frame due by now, in queue order
    pub fn tick(&mut self, dt: Duration) -> Vec<Bytes> {
        self.now += dt;

        let now = self.now;
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.in_flight)
            .into_iter()
            .partition(|p| p.deliver_at <= now);
        self.in_flight = pending;

        due.into_iter()
            .map(|packet| {
                let latency = (packet.deliver_at - packet.sent_at).as_millis() as u64;
                self.stats.frames_delivered += 1;
                self.stats.total_latency_ms += latency;
                self.stats.max_latency_ms = self.stats.max_latency_ms.max(latency);
                packet.frame
            })
            .collect()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn stats(&self) -> &ChaosStats {
        &self.stats
    }

    pub fn now(&self) -> Duration {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn frames(n: u8) -> impl Iterator<Item = Bytes> {
        (0..n).map(|i| Bytes::from(vec![i]))
    }

    #[test]
    fn test_perfect_link_delivers_in_order() {
        let mut link = ChaosLink::new(ChaosConfig::perfect(), 1);
        for frame in frames(20) {
            link.send(frame);
        }

        let delivered = link.tick(Duration::ZERO);
        assert_eq!(delivered, frames(20).collect::<Vec<_>>());
        assert_eq!(link.stats().loss_rate(), 0.0);
    }

    #[test]
    fn test_latency_holds_frames_back() {
        let config = ChaosConfig {
            latency: Duration::from_millis(50),
            ..ChaosConfig::perfect()
        };
        let mut link = ChaosLink::new(config, 1);
        link.send(Bytes::from_static(b"x"));

        assert!(link.tick(Duration::from_millis(49)).is_empty());
        assert_eq!(link.tick(Duration::from_millis(1)).len(), 1);
        assert_eq!(link.stats().max_latency_ms, 50);
    }

    #[test]
    fn test_blackout_drops_everything() {
        let mut link = ChaosLink::new(ChaosConfig::blackout(), 7);
        for frame in frames(50) {
            link.send(frame);
        }

        assert!(link.tick(Duration::from_secs(1)).is_empty());
        assert_eq!(link.stats().frames_lost, 50);
    }

    #[test]
    fn test_hostile_link_loses_frames() {
        let mut link = ChaosLink::new(ChaosConfig::hostile(), 12345);
        for i in 0..1000u32 {
            link.send(Bytes::from(i.to_le_bytes().to_vec()));
        }
        for _ in 0..200 {
            link.tick(Duration::from_millis(10));
        }

        let stats = link.stats();
        assert!(stats.loss_rate() > 0.05);
        assert!(stats.frames_delivered > 0);
        assert_eq!(link.in_flight(), 0);
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = |seed| {
            let mut link = ChaosLink::new(ChaosConfig::hostile(), seed);
            for frame in frames(100) {
                link.send(frame);
            }
            link.tick(Duration::from_secs(5))
        };

        assert_eq!(run(99), run(99));
    }

    proptest! {
        #[test]
        fn prop_perfect_link_is_transparent(
            payloads in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 1..32), 0..64),
        ) {
            let mut link = ChaosLink::new(ChaosConfig::perfect(), 3);
            for payload in &payloads {
                link.send(Bytes::from(payload.clone()));
            }

            let delivered: Vec<Vec<u8>> =
                link.tick(Duration::ZERO).into_iter().map(|b| b.to_vec()).collect();
            prop_assert_eq!(delivered, payloads);
        }
    }
}
