use store::config::GestureConfig;

/// End-of-drag translation in points. Positive `dy` is downwards.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Gesture {
    pub dx: f64,
    pub dy: f64,
}

/// What a gesture asks the viewer to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureAction {
    Forward,
    Backward,
    Dismiss,
    None,
}

impl Gesture {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Horizontal swipes win over the vertical dismiss.
    pub fn classify(&self, thresholds: &GestureConfig) -> GestureAction {
        if self.dx < -thresholds.swipe_threshold {
            GestureAction::Forward
        } else if self.dx > thresholds.swipe_threshold {
            GestureAction::Backward
        } else if self.dy > thresholds.dismiss_threshold {
            GestureAction::Dismiss
        } else {
            GestureAction::None
        }
    }
}

/// Half of the viewer that received a tap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapZone {
    Backward,
    Forward,
}

impl TapZone {
    /// Left half goes back. An unmeasured (zero) width counts as forward.
    pub fn from_position(x: f64, width: f64) -> Self {
        if x < width / 2.0 {
            TapZone::Backward
        } else {
            TapZone::Forward
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_swipes() {
        let t = GestureConfig::default();
        assert_eq!(Gesture::new(-31.0, 0.0).classify(&t), GestureAction::Forward);
        assert_eq!(Gesture::new(31.0, 0.0).classify(&t), GestureAction::Backward);
        assert_eq!(Gesture::new(-30.0, 0.0).classify(&t), GestureAction::None);
    }

    #[test]
    fn test_classify_dismiss() {
        let t = GestureConfig::default();
        assert_eq!(Gesture::new(0.0, 101.0).classify(&t), GestureAction::Dismiss);
        assert_eq!(Gesture::new(10.0, 100.0).classify(&t), GestureAction::None);
        assert_eq!(Gesture::new(0.0, -150.0).classify(&t), GestureAction::None);
        // A diagonal drag past both thresholds navigates
        assert_eq!(Gesture::new(-40.0, 150.0).classify(&t), GestureAction::Forward);
    }

    #[test]
    fn test_tap_zones() {
        assert_eq!(TapZone::from_position(10.0, 400.0), TapZone::Backward);
        assert_eq!(TapZone::from_position(200.0, 400.0), TapZone::Forward);
        assert_eq!(TapZone::from_position(10.0, 0.0), TapZone::Forward);
    }
}
