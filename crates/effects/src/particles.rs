//! Stepped particle bursts. A burst is spawned once from a [`BurstConfig`] and advanced
//! one tick at a time until its termination policy has removed every particle.

use std::f64::consts::TAU;
use std::fmt;

use foundation::color::Rgb;
use foundation::math::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Closed interval sampled uniformly. An empty or inverted span yields `min`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub const fn fixed(v: f64) -> Self {
        Self { min: v, max: v }
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        if self.max > self.min {
            rng.gen_range(self.min..self.max)
        } else {
            self.min
        }
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub target: Option<Vec2>,
    pub color: Rgb,
    /// Edge length for squares, radius for dots.
    pub size: f64,
    pub rotation: f64,
    pub rotation_speed: f64,
    pub life: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Physics {
    /// Added to vertical velocity every tick (screen y grows downward).
    pub gravity: f64,
    /// Fraction of velocity lost every tick.
    pub drag: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Motion {
    /// Integrate velocity under [`Physics`].
    Ballistic,
    /// Ease each particle a fraction of the remaining distance toward its target.
    SeekTargets { targets: Vec<Vec2>, ease: f64 },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Termination {
    /// Remove particles once they fall below `height + margin`.
    OffBottomEdge { height: f64, margin: f64 },
    /// Remove particles whose life reached zero.
    LifeExhausted,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Emitter {
    /// Uniform along a horizontal line of `width` at height `y`.
    Line { width: f64, y: f64 },
    /// Uniform in a square of half-extent `spread` around `center`.
    Around { center: Vec2, spread: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BurstConfig {
    pub count: usize,
    pub emitter: Emitter,
    pub velocity_x: Span,
    pub velocity_y: Span,
    pub hue: Span,
    pub saturation: f64,
    pub lightness: f64,
    pub size: Span,
    pub rotation_speed: Span,
    pub life_decay: f64,
    pub physics: Physics,
    pub motion: Motion,
    pub termination: Termination,
    /// Hard stop for bursts whose particles never terminate.
    pub max_ticks: u64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BurstStatus {
    Running,
    Complete,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CompletionReason {
    /// Every particle terminated.
    Drained,
    /// `max_ticks` elapsed first.
    TickLimit,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Completion {
    pub ticks: u64,
    pub reason: CompletionReason,
}

pub struct Burst {
    config: BurstConfig,
    particles: Vec<Particle>,
    ticks: u64,
    completion: Option<Completion>,
    completion_taken: bool,
    on_complete: Option<Box<dyn FnOnce(Completion)>>,
}

impl fmt::Debug for Burst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Burst")
            .field("particles", &self.particles.len())
            .field("ticks", &self.ticks)
            .field("completion", &self.completion)
            .finish()
    }
}

impl Burst {
    pub fn spawn(config: BurstConfig, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut particles = Vec::with_capacity(config.count);
        for i in 0..config.count {
            let position = match config.emitter {
                Emitter::Line { width, y } => Vec2::new(Span::new(0.0, width).sample(&mut rng), y),
                Emitter::Around { center, spread } => {
                    let s = Span::new(-spread, spread);
                    center + Vec2::new(s.sample(&mut rng), s.sample(&mut rng))
                }
            };
            let target = match &config.motion {
                Motion::SeekTargets { targets, .. } if !targets.is_empty() => {
                    Some(targets[i % targets.len()])
                }
                _ => None,
            };
            particles.push(Particle {
                position,
                velocity: Vec2::new(
                    config.velocity_x.sample(&mut rng),
                    config.velocity_y.sample(&mut rng),
                ),
                target,
                color: Rgb::from_hsl(config.hue.sample(&mut rng), config.saturation, config.lightness),
                size: config.size.sample(&mut rng),
                rotation: rng.gen_range(0.0..TAU),
                rotation_speed: config.rotation_speed.sample(&mut rng),
                life: 1.0,
            });
        }
        debug!(count = particles.len(), seed, "burst spawned");

        let mut burst = Self {
            config,
            particles,
            ticks: 0,
            completion: None,
            completion_taken: false,
            on_complete: None,
        };
        if burst.particles.is_empty() {
            burst.finish(CompletionReason::Drained);
        }
        burst
    }

    /// Registers a callback run once when the burst completes. Runs immediately if it
    /// already has.
    pub fn with_completion(mut self, f: impl FnOnce(Completion) + 'static) -> Self {
        match self.completion {
            Some(c) => f(c),
            None => self.on_complete = Some(Box::new(f)),
        }
        self
    }

    pub fn config(&self) -> &BurstConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn status(&self) -> BurstStatus {
        if self.completion.is_some() {
            BurstStatus::Complete
        } else {
            BurstStatus::Running
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completion.is_some()
    }

    /// The completion, handed out once.
    pub fn take_completion(&mut self) -> Option<Completion> {
        if self.completion_taken {
            return None;
        }
        let c = self.completion?;
        self.completion_taken = true;
        Some(c)
    }

    pub fn step(&mut self) -> BurstStatus {
        if self.completion.is_some() {
            return BurstStatus::Complete;
        }
        self.ticks += 1;

        let physics = self.config.physics;
        let decay = self.config.life_decay.max(0.0);
        for p in &mut self.particles {
            match &self.config.motion {
                Motion::Ballistic => {
                    p.position += p.velocity;
                    p.velocity.y += physics.gravity;
                    p.velocity = p.velocity * (1.0 - physics.drag.clamp(0.0, 1.0));
                }
                Motion::SeekTargets { ease, .. } => {
                    if let Some(target) = p.target {
                        p.position = p.position.ease_toward(target, *ease);
                    }
                }
            }
            p.rotation += p.rotation_speed;
            p.life = (p.life - decay).max(0.0);
        }

        match self.config.termination {
            Termination::OffBottomEdge { height, margin } => {
                self.particles.retain(|p| p.position.y <= height + margin)
            }
            Termination::LifeExhausted => self.particles.retain(|p| p.life > 0.0),
        }

        if self.particles.is_empty() {
            self.finish(CompletionReason::Drained);
        } else if self.ticks >= self.config.max_ticks {
            self.finish(CompletionReason::TickLimit);
        }
        self.status()
    }

    /// Steps until complete; returns the number of ticks taken.
    pub fn run_to_completion(&mut self) -> u64 {
        while self.step() == BurstStatus::Running {}
        self.ticks
    }

    fn finish(&mut self, reason: CompletionReason) {
        let completion = Completion {
            ticks: self.ticks,
            reason,
        };
        debug!(ticks = self.ticks, ?reason, "burst complete");
        self.completion = Some(completion);
        if let Some(f) = self.on_complete.take() {
            f(completion);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Burst, BurstConfig, BurstStatus, CompletionReason, Emitter, Motion, Physics, Span,
        Termination,
    };
    use foundation::math::Vec2;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn falling(count: usize) -> BurstConfig {
        BurstConfig {
            count,
            emitter: Emitter::Line { width: 100.0, y: 0.0 },
            velocity_x: Span::fixed(0.0),
            velocity_y: Span::new(1.0, 2.0),
            hue: Span::new(0.0, 360.0),
            saturation: 0.7,
            lightness: 0.6,
            size: Span::new(3.0, 11.0),
            rotation_speed: Span::new(-0.1, 0.1),
            life_decay: 0.01,
            physics: Physics {
                gravity: 0.5,
                drag: 0.0,
            },
            motion: Motion::Ballistic,
            termination: Termination::OffBottomEdge {
                height: 50.0,
                margin: 10.0,
            },
            max_ticks: 10_000,
        }
    }

    #[test]
    fn empty_span_samples_min() {
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(Span::new(2.0, 2.0).sample(&mut rng), 2.0);
        assert_eq!(Span::new(5.0, 1.0).sample(&mut rng), 5.0);
        let v = Span::new(1.0, 2.0).sample(&mut rng);
        assert!((1.0..2.0).contains(&v));
    }

    #[test]
    fn ballistic_burst_falls_off_and_completes() {
        let mut burst = Burst::spawn(falling(20), 1);
        assert_eq!(burst.particles().len(), 20);
        let ticks = burst.run_to_completion();
        assert!(ticks > 0 && ticks < 100);
        assert!(burst.particles().is_empty());
        assert_eq!(burst.status(), BurstStatus::Complete);
    }

    #[test]
    fn life_never_increases() {
        let mut burst = Burst::spawn(falling(5), 2);
        let mut last: Vec<f64> = burst.particles().iter().map(|p| p.life).collect();
        for _ in 0..5 {
            burst.step();
            let now: Vec<f64> = burst.particles().iter().map(|p| p.life).collect();
            assert!(now.iter().zip(&last).all(|(n, l)| n <= l));
            last = now;
        }
    }

    #[test]
    fn completion_is_taken_once_and_callback_runs_once() {
        let fired = Rc::new(RefCell::new(0));
        let f = fired.clone();
        let mut burst = Burst::spawn(falling(3), 3).with_completion(move |_| *f.borrow_mut() += 1);

        assert_eq!(burst.take_completion(), None);
        burst.run_to_completion();
        burst.step();
        burst.step();

        let c = burst.take_completion().expect("completion");
        assert_eq!(c.reason, CompletionReason::Drained);
        assert_eq!(burst.take_completion(), None);
        assert_eq!(*fired.borrow(), 1);
    }

    #[test]
    fn tick_limit_bounds_stuck_bursts() {
        let mut config = falling(4);
        config.physics.gravity = 0.0;
        config.velocity_y = Span::fixed(0.0);
        config.max_ticks = 30;
        let mut burst = Burst::spawn(config, 4);
        assert_eq!(burst.run_to_completion(), 30);
        assert_eq!(
            burst.take_completion().map(|c| c.reason),
            Some(CompletionReason::TickLimit)
        );
    }

    #[test]
    fn seeking_particles_converge_on_targets() {
        let mut config = falling(2);
        config.emitter = Emitter::Around {
            center: Vec2::new(50.0, 50.0),
            spread: 30.0,
        };
        config.motion = Motion::SeekTargets {
            targets: vec![Vec2::new(10.0, 10.0), Vec2::new(90.0, 10.0)],
            ease: 0.05,
        };
        config.termination = Termination::LifeExhausted;
        config.life_decay = 0.001;
        let mut burst = Burst::spawn(config, 5);
        for _ in 0..200 {
            burst.step();
        }
        let p = burst.particles();
        assert!((p[0].position - Vec2::new(10.0, 10.0)).length() < 0.01);
        assert!((p[1].position - Vec2::new(90.0, 10.0)).length() < 0.01);
    }

    #[test]
    fn zero_particles_complete_immediately() {
        let mut burst = Burst::spawn(falling(0), 6);
        assert!(burst.is_complete());
        assert_eq!(burst.step(), BurstStatus::Complete);
        assert_eq!(burst.take_completion().map(|c| c.ticks), Some(0));
    }
}
