use std::{collections::VecDeque, ops::RangeInclusive};

use rand::{rngs::StdRng, Rng, SeedableRng};

use super::{IoPolicy, Step, Workload};

/// Private random execution length; on reaching zero flips a coin between
/// exiting and requesting I/O.
#[derive(Debug)]
pub struct RandomBurst<R: Rng = StdRng> {
    remaining: u32,
    burst: RangeInclusive<u32>,
    io_probability: f64,
    policy: IoPolicy,
    rng: R,
}

impl RandomBurst<StdRng> {
    pub fn new(burst: RangeInclusive<u32>, io_probability: f64, policy: IoPolicy) -> Self {
        Self::with_rng(burst, io_probability, policy, StdRng::from_os_rng())
    }
}

impl<R: Rng> RandomBurst<R> {
    pub fn with_rng(
        burst: RangeInclusive<u32>,
        io_probability: f64,
        policy: IoPolicy,
        mut rng: R,
    ) -> Self {
        let remaining = rng.random_range(burst.clone());
        Self {
            remaining,
            burst,
            io_probability,
            policy,
            rng,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

impl<R: Rng> Workload for RandomBurst<R> {
    fn run_tick(&mut self) -> Step {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return Step::Continue;
        }

        if !self.rng.random_bool(self.io_probability) {
            return Step::Exit;
        }
        match self.policy {
            IoPolicy::Terminate => Step::IoThenExit,
            IoPolicy::Resume => {
                self.remaining = self.rng.random_range(self.burst.clone());
                Step::IoRequest
            }
        }
    }
}

/// Fixed bursts separated by I/O requests; exits after the last one.
#[derive(Debug, Clone)]
pub struct ScriptedBurst {
    bursts: VecDeque<u32>,
}

impl ScriptedBurst {
    pub fn new(bursts: impl IntoIterator<Item = u32>) -> Self {
        let bursts: VecDeque<u32> = bursts.into_iter().filter(|&b| b > 0).collect();
        assert!(!bursts.is_empty(), "scripted workload needs a non-empty burst");
        Self { bursts }
    }
}

impl Workload for ScriptedBurst {
    fn run_tick(&mut self) -> Step {
        let Some(current) = self.bursts.front_mut() else {
            return Step::Exit;
        };
        *current -= 1;
        if *current > 0 {
            return Step::Continue;
        }
        self.bursts.pop_front();
        if self.bursts.is_empty() {
            Step::Exit
        } else {
            Step::IoRequest
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(w: &mut impl Workload, limit: usize) -> Vec<Step> {
        let mut steps = Vec::new();
        for _ in 0..limit {
            let step = w.run_tick();
            steps.push(step);
            if step.exits() {
                break;
            }
        }
        steps
    }

    #[test]
    fn random_burst_draws_within_range() {
        for seed in 0..32 {
            let w = RandomBurst::with_rng(1..=10, 0.5, IoPolicy::Resume, StdRng::seed_from_u64(seed));
            assert!((1..=10).contains(&w.remaining()));
        }
    }

    #[test]
    fn random_burst_without_io_exits_after_its_length() {
        let mut w = RandomBurst::with_rng(4..=4, 0.0, IoPolicy::Resume, StdRng::seed_from_u64(7));
        assert_eq!(
            drive(&mut w, 10),
            vec![Step::Continue, Step::Continue, Step::Continue, Step::Exit]
        );
    }

    #[test]
    fn terminate_policy_couples_io_with_exit() {
        let mut w = RandomBurst::with_rng(2..=2, 1.0, IoPolicy::Terminate, StdRng::seed_from_u64(1));
        assert_eq!(drive(&mut w, 10), vec![Step::Continue, Step::IoThenExit]);
    }

    #[test]
    fn resume_policy_redraws_after_io() {
        let mut w = RandomBurst::with_rng(3..=3, 1.0, IoPolicy::Resume, StdRng::seed_from_u64(1));
        assert_eq!(
            drive(&mut w, 6),
            vec![
                Step::Continue,
                Step::Continue,
                Step::IoRequest,
                Step::Continue,
                Step::Continue,
                Step::IoRequest
            ]
        );
        assert_eq!(w.remaining(), 3);
    }

    #[test]
    fn scripted_bursts_request_io_between_phases() {
        let mut w = ScriptedBurst::new([2, 1]);
        assert_eq!(
            drive(&mut w, 10),
            vec![Step::Continue, Step::IoRequest, Step::Exit]
        );
    }
}
