//! Delayed simulation tasks
//!
//! Tasks are plain data naming their target by id or player generation. The
//! owning state checks the target is still alive before acting, so a task
//! that outlives its entity simply does nothing.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::entity::{EntityId, Faction};
use super::wave::KeepoutZone;

/// Work to run once its delay elapses
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// Place an asteroid wave (telegraphed spawn)
    SpawnWave { count: u32, player_zone: KeepoutZone },
    /// Repeating saucer period; schedules one `SpawnSaucer` per period
    SaucerCycle,
    SpawnSaucer,
    SaucerFireReady(EntityId),
    ExpireProjectile { faction: Faction, id: EntityId },
    FinishExplosion(EntityId),
    PlayerFireReady { generation: u32 },
    EndInvincibility { generation: u32 },
    /// Toggle visibility while invincible
    BlinkPlayer { generation: u32, visible: bool },
    RespawnPlayer,
    GameOver,
}

#[derive(Debug, Clone)]
struct Scheduled {
    due_ms: u64,
    seq: u64,
    task: Task,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl Ord for Scheduled {
    // Reversed so BinaryHeap pops the earliest (then first-scheduled) task
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .cmp(&self.due_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Simulation clock plus pending one-shot tasks
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now_ms: u64,
    next_seq: u64,
    queue: BinaryHeap<Scheduled>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn schedule(&mut self, delay_ms: u64, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Scheduled {
            due_ms: self.now_ms + delay_ms,
            seq,
            task,
        });
    }

    pub fn advance(&mut self, dt_ms: u64) {
        self.now_ms += dt_ms;
    }

    /// Next task whose due time has been reached
    pub fn pop_due(&mut self) -> Option<Task> {
        if self.queue.peek()?.due_ms > self.now_ms {
            return None;
        }
        self.queue.pop().map(|scheduled| scheduled.task)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Number of pending tasks matching `predicate`
    pub fn count_pending(&self, predicate: impl Fn(&Task) -> bool) -> usize {
        self.queue.iter().filter(|s| predicate(&s.task)).count()
    }
}
