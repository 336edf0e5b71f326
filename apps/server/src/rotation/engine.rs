use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::models::{Ad, GlobalTracking, RotatorConfig};

/// Where the rotator is in its display cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationState {
    /// No eligible ads
    Idle,
    /// Showing the ad at this index; the timer runs when more than one ad is eligible
    Displaying(usize),
    /// Showing the ad at this index with rotation suspended by pointer hover
    Paused(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RotationError {
    #[error("Ad index {index} is out of range ({len} eligible ads)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Ads that may be shown at `now`, in their configured order
pub fn eligible_ads<'a, I>(ads: I, now: DateTime<Utc>) -> Vec<Ad>
where
    I: IntoIterator<Item = &'a Ad>,
{
    ads.into_iter()
        .filter(|ad| ad.is_eligible_at(now))
        .cloned()
        .collect()
}

/// Round-robin ad rotation state machine.
///
/// The rotator owns no timer. Transition methods that enter `Displaying`
/// return the index now on screen; the host fires exactly one impression for
/// it. `mount` leaves that to the host via [`AdRotator::current_index`].
#[derive(Debug, Clone)]
pub struct AdRotator {
    interval: Duration,
    pause_on_hover: bool,
    show_navigation: bool,
    global_tracking: Option<GlobalTracking>,
    ads: Vec<Ad>,
    state: RotationState,
}

impl AdRotator {
    /// Builds the rotator for a block and filters its ads at `now`
    pub fn mount(config: &RotatorConfig, now: DateTime<Utc>) -> Self {
        let mut rotator = Self {
            interval: config.rotation_interval(),
            pause_on_hover: config.pause_on_hover(),
            show_navigation: config.show_navigation(),
            global_tracking: config.global_tracking(),
            ads: Vec::new(),
            state: RotationState::Idle,
        };
        rotator.set_ads(config.populated_ads(), now);
        rotator
    }

    pub fn state(&self) -> RotationState {
        self.state
    }

    pub fn ads(&self) -> &[Ad] {
        &self.ads
    }

    pub fn len(&self) -> usize {
        self.ads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ads.is_empty()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn global_tracking(&self) -> Option<&GlobalTracking> {
        self.global_tracking.as_ref()
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            RotationState::Idle => None,
            RotationState::Displaying(i) | RotationState::Paused(i) => Some(i),
        }
    }

    pub fn current_ad(&self) -> Option<&Ad> {
        self.current_index().and_then(|i| self.ads.get(i))
    }

    /// Navigation dots are only useful with more than one ad
    pub fn shows_navigation(&self) -> bool {
        self.show_navigation && self.ads.len() > 1
    }

    /// Whether the host should have the rotation timer running
    pub fn timer_armed(&self) -> bool {
        matches!(self.state, RotationState::Displaying(_)) && self.ads.len() > 1
    }

    /// Replaces the candidate list. Restarts at the first eligible ad.
    pub fn set_ads<'a, I>(&mut self, ads: I, now: DateTime<Utc>) -> Option<usize>
    where
        I: IntoIterator<Item = &'a Ad>,
    {
        self.ads = eligible_ads(ads, now);
        if self.ads.is_empty() {
            self.state = RotationState::Idle;
            None
        } else {
            self.enter(0)
        }
    }

    /// Timer fired: advance to the next ad
    pub fn tick(&mut self) -> Option<usize> {
        match self.state {
            RotationState::Displaying(i) if self.ads.len() > 1 => {
                self.enter((i + 1) % self.ads.len())
            }
            _ => None,
        }
    }

    /// Pointer entered the rotator. Returns true when rotation paused.
    pub fn pointer_enter(&mut self) -> bool {
        match self.state {
            RotationState::Displaying(i) if self.pause_on_hover => {
                self.state = RotationState::Paused(i);
                true
            }
            _ => false,
        }
    }

    /// Pointer left the rotator: resume on the frozen ad
    pub fn pointer_leave(&mut self) -> Option<usize> {
        match self.state {
            RotationState::Paused(i) => self.enter(i),
            _ => None,
        }
    }

    /// Manual selection from the navigation dots
    pub fn navigate(&mut self, index: usize) -> Result<usize, RotationError> {
        if index >= self.ads.len() {
            return Err(RotationError::IndexOutOfRange {
                index,
                len: self.ads.len(),
            });
        }
        self.enter(index);
        Ok(index)
    }

    fn enter(&mut self, index: usize) -> Option<usize> {
        self.state = RotationState::Displaying(index);
        Some(index)
    }
}
