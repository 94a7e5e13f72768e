use crate::config::cli::RandomOpt;
use crate::traffic::ScheduledEvent;
use anyhow::bail;
use fastrand::Rng;
use l3_rate_tracer::{Face, Topology, TrafficEvent};
use std::sync::Arc;
use std::time::Duration;

const INTEREST_LIFETIME: Duration = Duration::from_secs(4);
const CACHE_LOOKUP_DELAY: Duration = Duration::from_millis(1);

/// Generates Interest exchanges on every face of every node
///
/// Each exchange goes one of two ways. Upstream, the node sends an Interest and later receives
/// Data, a Nack or nothing at all (the Interest times out). Downstream, the node receives an
/// Interest and drops it, answers with a Nack or answers with Data, possibly from its cache.
pub struct RandomTraffic {
    rng: Rng,
    exchanges_per_second: f64,
    cache_hit_ratio: f64,
    drop_ratio: f64,
    nack_ratio: f64,
    timeout_ratio: f64,
}

impl RandomTraffic {
    pub fn from_opt(opt: &RandomOpt, seed: u64) -> anyhow::Result<Self> {
        if !opt.exchanges_per_second.is_finite() || opt.exchanges_per_second <= 0.0 {
            bail!(
                "exchanges per second must be a positive number, got {}",
                opt.exchanges_per_second
            );
        }

        for (name, ratio) in [
            ("cache hit ratio", opt.cache_hit_ratio),
            ("drop ratio", opt.drop_ratio),
            ("nack ratio", opt.nack_ratio),
            ("timeout ratio", opt.timeout_ratio),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                bail!("{name} must be between 0 and 1, got {ratio}");
            }
        }

        if opt.drop_ratio + opt.nack_ratio > 1.0 || opt.nack_ratio + opt.timeout_ratio > 1.0 {
            bail!("drop, nack and timeout ratios leave no room for successful exchanges");
        }

        Ok(Self {
            rng: Rng::with_seed(seed),
            exchanges_per_second: opt.exchanges_per_second,
            cache_hit_ratio: opt.cache_hit_ratio,
            drop_ratio: opt.drop_ratio,
            nack_ratio: opt.nack_ratio,
            timeout_ratio: opt.timeout_ratio,
        })
    }

    /// All events starting before `duration`, ordered by time
    pub fn generate(mut self, topology: &Topology, duration: Duration) -> Vec<ScheduledEvent> {
        let mut events = Vec::new();
        for node in topology.nodes() {
            for face in node.faces() {
                let mut exchange_start = Duration::ZERO;
                loop {
                    exchange_start += self.next_gap();
                    if exchange_start >= duration {
                        break;
                    }

                    if self.rng.bool() {
                        self.upstream_exchange(node.name(), face, exchange_start, &mut events);
                    } else {
                        self.downstream_exchange(node.name(), face, exchange_start, &mut events);
                    }
                }
            }
        }

        events.sort_by_key(|e| e.at);
        events
    }

    fn upstream_exchange(
        &mut self,
        node: &Arc<str>,
        face: &Face,
        start: Duration,
        events: &mut Vec<ScheduledEvent>,
    ) {
        let mut push = |at, event, size_bytes| {
            events.push(ScheduledEvent {
                at,
                node: node.clone(),
                face: face.clone(),
                event,
                size_bytes,
            })
        };

        push(start, TrafficEvent::OutInterest, self.interest_size());

        let outcome = self.rng.f64();
        let answered_at = start + self.round_trip();
        if outcome < self.nack_ratio {
            push(answered_at, TrafficEvent::InNack, self.interest_size());
        } else if outcome < self.nack_ratio + self.timeout_ratio {
            push(start + INTEREST_LIFETIME, TrafficEvent::TimedOutInterest, 0);
        } else {
            push(answered_at, TrafficEvent::InData, self.data_size());
            push(answered_at, TrafficEvent::SatisfiedInterest, 0);
        }
    }

    fn downstream_exchange(
        &mut self,
        node: &Arc<str>,
        face: &Face,
        start: Duration,
        events: &mut Vec<ScheduledEvent>,
    ) {
        let mut push = |at, event, size_bytes| {
            events.push(ScheduledEvent {
                at,
                node: node.clone(),
                face: face.clone(),
                event,
                size_bytes,
            })
        };

        let interest_size = self.interest_size();
        push(start, TrafficEvent::InInterest, interest_size);

        let outcome = self.rng.f64();
        if outcome < self.drop_ratio {
            push(start, TrafficEvent::DropInterest, interest_size);
        } else if outcome < self.drop_ratio + self.nack_ratio {
            push(start + CACHE_LOOKUP_DELAY, TrafficEvent::OutNack, interest_size);
        } else {
            let from_cache = self.rng.f64() < self.cache_hit_ratio;
            let answered_at = if from_cache {
                start + CACHE_LOOKUP_DELAY
            } else {
                start + self.round_trip()
            };
            push(
                answered_at,
                TrafficEvent::OutData { from_cache },
                self.data_size(),
            );
        }
    }

    /// Exponentially distributed, so exchanges on a face form a Poisson process
    fn next_gap(&mut self) -> Duration {
        let uniform = 1.0 - self.rng.f64();
        Duration::from_secs_f64(-uniform.ln() / self.exchanges_per_second)
    }

    fn round_trip(&mut self) -> Duration {
        Duration::from_millis(self.rng.u64(10..=80))
    }

    fn interest_size(&mut self) -> u64 {
        self.rng.u64(40..=120)
    }

    fn data_size(&mut self) -> u64 {
        self.rng.u64(1024..=8800)
    }
}
