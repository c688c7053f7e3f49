use effects::{Burst, BurstStatus, ParticleCanvas, TreeBurstConfig, draw_tree};
use foundation::time::Time;
use runtime::{EVENT_BURST_COMPLETE, EVENT_DONATION_COMMITTED, Event, EventBus};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DonationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DonationPresets {
    pub amounts: Vec<f64>,
    pub default_amount: f64,
    /// Delay between the donate action and the amount reaching the page.
    pub commit_delay_ms: f64,
    pub tree: TreeBurstConfig,
}

impl Default for DonationPresets {
    fn default() -> Self {
        Self {
            amounts: vec![10.0, 25.0, 50.0, 100.0, 250.0, 500.0],
            default_amount: 25.0,
            commit_delay_ms: 2000.0,
            tree: TreeBurstConfig::default(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DonationPhase {
    Idle,
    /// Donate was pressed; the amount commits once the delay has elapsed.
    Animating { amount: f64, started: Time },
}

fn validate(amount: f64) -> Result<f64, DonationError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(DonationError::InvalidAmount(amount))
    }
}

/// Amount picker and donate action. Donating plays the tree burst and hands the amount
/// to the page after a short delay; further donations are refused meanwhile.
#[derive(Debug)]
pub struct DonationPanel {
    presets: DonationPresets,
    selected: f64,
    phase: DonationPhase,
    tree: Option<Burst>,
    seed: u64,
    committed: u64,
    events: EventBus,
}

impl DonationPanel {
    pub fn new(presets: DonationPresets, seed: u64) -> Self {
        let selected = validate(presets.default_amount)
            .ok()
            .or_else(|| presets.amounts.first().copied())
            .unwrap_or(1.0);
        Self {
            presets,
            selected,
            phase: DonationPhase::Idle,
            tree: None,
            seed,
            committed: 0,
            events: EventBus::new(),
        }
    }

    pub fn presets(&self) -> &[f64] {
        &self.presets.amounts
    }

    pub fn selected(&self) -> f64 {
        self.selected
    }

    pub fn phase(&self) -> DonationPhase {
        self.phase
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.phase, DonationPhase::Animating { .. })
    }

    pub fn tree(&self) -> Option<&Burst> {
        self.tree.as_ref()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    pub fn select_preset(&mut self, index: usize) -> Option<f64> {
        let amount = *self.presets.amounts.get(index)?;
        self.selected = amount;
        Some(amount)
    }

    pub fn select_custom(&mut self, amount: f64) -> Result<f64, DonationError> {
        self.selected = validate(amount)?;
        Ok(self.selected)
    }

    /// Starts the donate animation for the selected amount.
    pub fn donate(&mut self, now: Time) -> Result<f64, DonationError> {
        if self.is_animating() {
            return Err(DonationError::Busy);
        }
        let amount = validate(self.selected)?;
        self.phase = DonationPhase::Animating {
            amount,
            started: now,
        };
        if self.tree.is_none() {
            let seed = self.seed.wrapping_add(self.committed);
            self.tree = Some(self.presets.tree.spawn(seed));
        }
        debug!(amount, "donation started");
        Ok(amount)
    }

    /// The amount to add to the page's total once the delay has passed.
    pub fn poll_commit(&mut self, now: Time) -> Option<f64> {
        let DonationPhase::Animating { amount, started } = self.phase else {
            return None;
        };
        if now.since(started) * 1000.0 < self.presets.commit_delay_ms {
            return None;
        }
        self.phase = DonationPhase::Idle;
        self.committed += 1;
        self.events
            .emit(self.committed, EVENT_DONATION_COMMITTED, format!("{amount}"));
        debug!(amount, "donation committed");
        Some(amount)
    }

    /// One frame of the tree burst. The finished burst is dropped after reporting.
    pub fn step_tree(&mut self) -> Option<BurstStatus> {
        let burst = self.tree.as_mut()?;
        let status = burst.step();
        if let Some(done) = burst.take_completion() {
            self.events.emit(done.ticks, EVENT_BURST_COMPLETE, "tree");
            self.tree = None;
        }
        Some(status)
    }

    pub fn draw_tree<C: ParticleCanvas + ?Sized>(&self, canvas: &mut C) {
        if let Some(burst) = &self.tree {
            draw_tree(canvas, burst, &self.presets.tree.trunk());
        }
    }

    /// Abandons a pending commit and any running burst.
    pub fn cancel(&mut self) {
        self.phase = DonationPhase::Idle;
        self.tree = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{DonationPanel, DonationPhase, DonationPresets};
    use crate::error::DonationError;
    use effects::BurstStatus;
    use foundation::time::Time;
    use pretty_assertions::assert_eq;
    use runtime::{EVENT_BURST_COMPLETE, EVENT_DONATION_COMMITTED};

    fn ms(v: f64) -> Time {
        Time::from_millis(v)
    }

    fn panel() -> DonationPanel {
        DonationPanel::new(DonationPresets::default(), 3)
    }

    #[test]
    fn defaults_to_twenty_five() {
        let p = panel();
        assert_eq!(p.selected(), 25.0);
        assert_eq!(p.presets(), &[10.0, 25.0, 50.0, 100.0, 250.0, 500.0]);
    }

    #[test]
    fn presets_and_custom_amounts() {
        let mut p = panel();
        assert_eq!(p.select_preset(3), Some(100.0));
        assert_eq!(p.select_preset(42), None);
        assert_eq!(p.selected(), 100.0);
        assert_eq!(p.select_custom(12.5), Ok(12.5));
        assert_eq!(p.select_custom(0.0), Err(DonationError::InvalidAmount(0.0)));
        assert!(p.select_custom(f64::NAN).is_err());
        assert_eq!(p.selected(), 12.5);
    }

    #[test]
    fn donate_locks_until_commit() {
        let mut p = panel();
        assert_eq!(p.donate(ms(0.0)), Ok(25.0));
        assert!(p.is_animating());
        assert_eq!(p.donate(ms(100.0)), Err(DonationError::Busy));

        assert_eq!(p.poll_commit(ms(1999.0)), None);
        assert_eq!(p.poll_commit(ms(2000.0)), Some(25.0));
        assert_eq!(p.poll_commit(ms(3000.0)), None);
        assert_eq!(p.phase(), DonationPhase::Idle);
        assert_eq!(p.events().count(EVENT_DONATION_COMMITTED), 1);
        assert!(p.donate(ms(3000.0)).is_ok());
    }

    #[test]
    fn tree_burst_completes_once() {
        let mut p = panel();
        p.donate(ms(0.0)).expect("donate");
        assert!(p.tree().is_some());

        let mut frames = 0;
        while p.step_tree() == Some(BurstStatus::Running) {
            frames += 1;
            assert!(frames < 1000);
        }
        assert_eq!(p.step_tree(), None);
        assert_eq!(p.events().count(EVENT_BURST_COMPLETE), 1);
        assert!(p.tree().is_none());
    }

    #[test]
    fn drained_events_are_gone() {
        let mut p = panel();
        p.donate(ms(0.0)).expect("donate");
        p.poll_commit(ms(5000.0));
        assert_eq!(p.drain_events().len(), 1);
        assert!(p.events().events().is_empty());
    }

    #[test]
    fn partial_presets_json_keeps_defaults() {
        let presets: DonationPresets =
            serde_json::from_str(r#"{"amounts": [5, 15], "default_amount": 15}"#).expect("parse");
        assert_eq!(presets.amounts, vec![5.0, 15.0]);
        assert_eq!(presets.default_amount, 15.0);
        assert_eq!(presets.commit_delay_ms, 2000.0);
        assert_eq!(presets.tree, DonationPresets::default().tree);
    }
}
