//! Fixed progress checkpoints reported after each texture load.

use crate::AssetError;

/// One checkpoint per load, strictly increasing, ending at exactly 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSchedule {
    checkpoints: Vec<f32>,
}

impl ProgressSchedule {
    /// Evenly spaced checkpoints `(i + 1) / count`.
    pub fn even(count: usize) -> Self {
        let checkpoints = (1..=count)
            .map(|i| if i == count { 1.0 } else { i as f32 / count as f32 })
            .collect();
        Self { checkpoints }
    }

    /// Custom checkpoints, validated.
    pub fn custom(checkpoints: Vec<f32>) -> Result<Self, AssetError> {
        let Some(&last) = checkpoints.last() else {
            return Err(AssetError::InvalidSchedule("no checkpoints".to_string()));
        };
        if let Some(bad) = checkpoints.iter().find(|c| !c.is_finite()) {
            return Err(AssetError::InvalidSchedule(format!(
                "checkpoints must be finite, got {bad}"
            )));
        }
        if last != 1.0 {
            return Err(AssetError::InvalidSchedule(format!(
                "last checkpoint must be 1.0, got {last}"
            )));
        }
        if checkpoints[0] <= 0.0 {
            return Err(AssetError::InvalidSchedule(format!(
                "first checkpoint must be in (0, 1], got {}",
                checkpoints[0]
            )));
        }
        if let Some(pair) = checkpoints.windows(2).find(|pair| pair[1] <= pair[0]) {
            return Err(AssetError::InvalidSchedule(format!(
                "checkpoints must strictly increase, got {} then {}",
                pair[0], pair[1]
            )));
        }
        Ok(Self { checkpoints })
    }

    pub fn checkpoints(&self) -> &[f32] {
        &self.checkpoints
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_schedule_of_six() {
        let schedule = ProgressSchedule::even(6);
        assert_eq!(schedule.len(), 6);
        assert_eq!(schedule.checkpoints()[0], 1.0 / 6.0);
        assert_eq!(*schedule.checkpoints().last().unwrap(), 1.0);
        assert!(schedule.checkpoints().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_even_schedule_of_one() {
        assert_eq!(ProgressSchedule::even(1).checkpoints(), &[1.0]);
    }

    #[test]
    fn test_non_finite_checkpoint_rejected() {
        for bad in [f32::NAN, f32::INFINITY] {
            let err = ProgressSchedule::custom(vec![0.5, bad, 1.0]).unwrap_err();
            assert!(matches!(err, AssetError::InvalidSchedule(_)), "{bad} accepted");
        }
    }

    #[test]
    fn test_custom_schedule_accepted() {
        let schedule = ProgressSchedule::custom(vec![0.2, 0.3, 0.4, 0.5, 0.6, 1.0]).unwrap();
        assert_eq!(schedule.len(), 6);
    }

    #[test]
    fn test_custom_schedule_must_end_at_one() {
        let err = ProgressSchedule::custom(vec![0.2, 0.7]).unwrap_err();
        assert!(matches!(err, AssetError::InvalidSchedule(_)));
    }

    #[test]
    fn test_custom_schedule_must_increase() {
        assert!(ProgressSchedule::custom(vec![0.5, 0.5, 1.0]).is_err());
        assert!(ProgressSchedule::custom(vec![0.6, 0.4, 1.0]).is_err());
    }

    #[test]
    fn test_custom_schedule_rejects_empty_and_zero() {
        assert!(ProgressSchedule::custom(Vec::new()).is_err());
        assert!(ProgressSchedule::custom(vec![0.0, 1.0]).is_err());
    }
}
