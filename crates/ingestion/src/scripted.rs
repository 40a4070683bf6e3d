//! Scripted snapshot source
//!
//! In-memory sequence of signal updates, for tests and demos.

use std::collections::VecDeque;

use contracts::{CycleInput, SignalUpdate};

use crate::latch::SignalLatch;
use crate::source::SnapshotSource;

/// One scripted cycle
#[derive(Debug, Clone, Copy)]
pub struct ScriptStep {
    pub update: SignalUpdate,
    pub vego: f64,
}

/// Replays a fixed list of steps, one per cycle
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    name: String,
    steps: VecDeque<ScriptStep>,
    latch: SignalLatch,
    next_cycle: u64,
}

impl ScriptedSource {
    /// Create an empty script starting at cycle 0
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: VecDeque::new(),
            latch: SignalLatch::new(),
            next_cycle: 0,
        }
    }

    /// Start numbering cycles at `cycle`
    pub fn starting_at(mut self, cycle: u64) -> Self {
        self.next_cycle = cycle;
        self
    }

    /// Append one step
    pub fn step(mut self, update: SignalUpdate, vego: f64) -> Self {
        self.steps.push_back(ScriptStep { update, vego });
        self
    }

    /// Append `count` cycles without new messages
    pub fn idle(mut self, count: usize, vego: f64) -> Self {
        for _ in 0..count {
            self.steps.push_back(ScriptStep {
                update: SignalUpdate::none(),
                vego,
            });
        }
        self
    }

    /// Steps not yet consumed
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl SnapshotSource for ScriptedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_input(&mut self) -> Option<CycleInput> {
        let step = self.steps.pop_front()?;
        self.latch.apply(&step.update);

        let cycle_index = self.next_cycle;
        self.next_cycle += 1;

        Some(CycleInput {
            cycle_index,
            snapshot: self.latch.snapshot(),
            vego: step.vego,
        })
    }
}
