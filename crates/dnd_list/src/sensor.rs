use std::time::{Duration, Instant};

use gpui::{Pixels, Point, px};

/// When a press on a drag handle turns into a drag.
///
/// Either constraint activates the drag: moving at least `distance` from the press point,
/// or holding for `hold_delay` without leaving `tolerance`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragActivation {
    pub distance: Pixels,
    pub hold_delay: Option<Duration>,
    pub tolerance: Pixels,
}

impl Default for DragActivation {
    fn default() -> Self {
        Self {
            distance: px(8.),
            hold_delay: Some(Duration::from_millis(250)),
            tolerance: px(5.),
        }
    }
}

impl DragActivation {
    /// Activate on distance only.
    pub fn distance(distance: Pixels) -> Self {
        Self {
            distance,
            hold_delay: None,
            tolerance: px(0.),
        }
    }

    pub fn hold_delay(mut self, delay: Duration, tolerance: Pixels) -> Self {
        self.hold_delay = Some(delay);
        self.tolerance = tolerance;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Phase {
    Idle,
    Pending {
        ix: usize,
        origin: Point<Pixels>,
        pressed_at: Instant,
        /// The pointer left the tolerance box before the hold delay ran out.
        hold_forfeited: bool,
    },
    Active {
        ix: usize,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SensorEvent {
    /// No gesture in progress.
    Ignored,
    /// Still waiting for an activation constraint.
    Pending,
    /// The press just became a drag of row `ix`.
    Activated { ix: usize },
    Moved,
}

/// `Idle -> Pending -> Active -> Idle`, driven by pointer events.
#[derive(Clone, Debug)]
pub struct DragSensor {
    activation: DragActivation,
    phase: Phase,
}

impl DragSensor {
    pub fn new(activation: DragActivation) -> Self {
        Self {
            activation,
            phase: Phase::Idle,
        }
    }

    pub fn activation(&self) -> DragActivation {
        self.activation
    }

    pub fn set_activation(&mut self, activation: DragActivation) {
        self.activation = activation;
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Active { .. })
    }

    /// The row being pressed or dragged.
    pub fn index(&self) -> Option<usize> {
        match self.phase {
            Phase::Idle => None,
            Phase::Pending { ix, .. } | Phase::Active { ix } => Some(ix),
        }
    }

    pub fn press(&mut self, ix: usize, position: Point<Pixels>, now: Instant) {
        self.phase = Phase::Pending {
            ix,
            origin: position,
            pressed_at: now,
            hold_forfeited: false,
        };
    }

    pub fn move_to(&mut self, position: Point<Pixels>, now: Instant) -> SensorEvent {
        let activation = self.activation;
        match &mut self.phase {
            Phase::Idle => SensorEvent::Ignored,
            Phase::Active { .. } => SensorEvent::Moved,
            Phase::Pending {
                ix,
                origin,
                pressed_at,
                hold_forfeited,
            } => {
                let ix = *ix;
                let travelled = distance(*origin, position);
                let held = activation
                    .hold_delay
                    .is_some_and(|delay| now.saturating_duration_since(*pressed_at) >= delay);

                if travelled >= f32::from(activation.distance)
                    || (held && !*hold_forfeited && travelled <= f32::from(activation.tolerance))
                {
                    self.phase = Phase::Active { ix };
                    return SensorEvent::Activated { ix };
                }
                if !held && travelled > f32::from(activation.tolerance) {
                    *hold_forfeited = true;
                }
                SensorEvent::Pending
            }
        }
    }

    /// Check the hold delay without a pointer move. Called when the hold timer fires.
    pub fn tick(&mut self, now: Instant) -> SensorEvent {
        let Some(delay) = self.activation.hold_delay else {
            return match self.phase {
                Phase::Idle => SensorEvent::Ignored,
                Phase::Pending { .. } => SensorEvent::Pending,
                Phase::Active { .. } => SensorEvent::Moved,
            };
        };
        match self.phase {
            Phase::Idle => SensorEvent::Ignored,
            Phase::Active { .. } => SensorEvent::Moved,
            Phase::Pending {
                ix,
                pressed_at,
                hold_forfeited,
                ..
            } => {
                if hold_forfeited || now.saturating_duration_since(pressed_at) < delay {
                    return SensorEvent::Pending;
                }
                self.phase = Phase::Active { ix };
                SensorEvent::Activated { ix }
            }
        }
    }

    /// End the gesture. Returns the dragged row when a drag was active.
    pub fn release(&mut self) -> Option<usize> {
        let phase = std::mem::replace(&mut self.phase, Phase::Idle);
        match phase {
            Phase::Active { ix } => Some(ix),
            Phase::Idle | Phase::Pending { .. } => None,
        }
    }

    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
    }
}

impl Default for DragSensor {
    fn default() -> Self {
        Self::new(DragActivation::default())
    }
}

fn distance(a: Point<Pixels>, b: Point<Pixels>) -> f32 {
    let dx = f32::from(b.x - a.x);
    let dy = f32::from(b.y - a.y);
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpui::point;

    fn at(x: f32, y: f32) -> Point<Pixels> {
        point(px(x), px(y))
    }

    #[test]
    fn click_without_travel_never_drags() {
        let mut sensor = DragSensor::new(DragActivation::distance(px(8.)));
        let t0 = Instant::now();
        sensor.press(2, at(10., 10.), t0);
        assert_eq!(sensor.move_to(at(13., 12.), t0), SensorEvent::Pending);
        assert_eq!(sensor.release(), None);
        assert!(sensor.is_idle());
    }

    #[test]
    fn distance_activates_drag() {
        let mut sensor = DragSensor::new(DragActivation::distance(px(8.)));
        let t0 = Instant::now();
        sensor.press(1, at(0., 0.), t0);
        assert_eq!(
            sensor.move_to(at(0., 8.), t0),
            SensorEvent::Activated { ix: 1 }
        );
        assert_eq!(sensor.move_to(at(0., 30.), t0), SensorEvent::Moved);
        assert_eq!(sensor.release(), Some(1));
    }

    #[test]
    fn hold_within_tolerance_activates() {
        let mut sensor = DragSensor::default();
        let t0 = Instant::now();
        sensor.press(0, at(0., 0.), t0);
        assert_eq!(
            sensor.move_to(at(2., 2.), t0 + Duration::from_millis(100)),
            SensorEvent::Pending
        );
        assert_eq!(
            sensor.move_to(at(3., 2.), t0 + Duration::from_millis(260)),
            SensorEvent::Activated { ix: 0 }
        );
    }

    #[test]
    fn leaving_tolerance_early_forfeits_hold() {
        let mut sensor = DragSensor::default();
        let t0 = Instant::now();
        sensor.press(0, at(0., 0.), t0);
        assert_eq!(
            sensor.move_to(at(6., 0.), t0 + Duration::from_millis(50)),
            SensorEvent::Pending
        );
        assert_eq!(
            sensor.move_to(at(4., 0.), t0 + Duration::from_millis(400)),
            SensorEvent::Pending
        );
        assert_eq!(
            sensor.move_to(at(9., 0.), t0 + Duration::from_millis(450)),
            SensorEvent::Activated { ix: 0 }
        );
    }

    #[test]
    fn holding_still_activates_when_the_delay_runs_out() {
        let mut sensor = DragSensor::default();
        let t0 = Instant::now();
        sensor.press(3, at(0., 0.), t0);
        assert_eq!(
            sensor.tick(t0 + Duration::from_millis(100)),
            SensorEvent::Pending
        );
        assert_eq!(
            sensor.tick(t0 + Duration::from_millis(250)),
            SensorEvent::Activated { ix: 3 }
        );
        assert!(sensor.is_active());
        assert_eq!(sensor.release(), Some(3));
    }

    #[test]
    fn timer_after_forfeit_or_release_does_nothing() {
        let mut sensor = DragSensor::default();
        let t0 = Instant::now();
        sensor.press(0, at(0., 0.), t0);
        sensor.move_to(at(6., 0.), t0 + Duration::from_millis(50));
        assert_eq!(
            sensor.tick(t0 + Duration::from_millis(300)),
            SensorEvent::Pending
        );

        sensor.press(0, at(0., 0.), t0);
        assert_eq!(sensor.release(), None);
        assert_eq!(
            sensor.tick(t0 + Duration::from_millis(300)),
            SensorEvent::Ignored
        );
    }

    #[test]
    fn distance_only_activation_ignores_the_timer() {
        let mut sensor = DragSensor::new(DragActivation::distance(px(8.)));
        let t0 = Instant::now();
        sensor.press(0, at(0., 0.), t0);
        assert_eq!(sensor.tick(t0 + Duration::from_secs(5)), SensorEvent::Pending);
    }

    #[test]
    fn moves_without_press_are_ignored() {
        let mut sensor = DragSensor::default();
        assert_eq!(
            sensor.move_to(at(50., 50.), Instant::now()),
            SensorEvent::Ignored
        );
    }
}
