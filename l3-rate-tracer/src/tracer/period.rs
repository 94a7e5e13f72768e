use crate::error::TracerError;
use std::time::Duration;

pub const DEFAULT_AVERAGING_PERIOD: Duration = Duration::from_millis(500);

/// Length of the window counters are accumulated over; always strictly positive
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AveragingPeriod(Duration);

impl AveragingPeriod {
    pub fn new(period: Duration) -> Result<Self, TracerError> {
        if period.is_zero() {
            return Err(TracerError::InvalidArgument(
                "averaging period must be greater than zero".to_string(),
            ));
        }

        Ok(Self(period))
    }

    pub fn from_secs_f64(secs: f64) -> Result<Self, TracerError> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(TracerError::InvalidArgument(format!(
                "averaging period must be a positive number of seconds, got {secs}"
            )));
        }

        let period = Duration::try_from_secs_f64(secs)
            .map_err(|e| TracerError::InvalidArgument(format!("averaging period {secs}s: {e}")))?;
        Self::new(period)
    }

    pub fn from_millis(millis: u64) -> Result<Self, TracerError> {
        Self::new(Duration::from_millis(millis))
    }

    pub fn as_duration(self) -> Duration {
        self.0
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0.as_secs_f64()
    }
}

impl Default for AveragingPeriod {
    fn default() -> Self {
        Self(DEFAULT_AVERAGING_PERIOD)
    }
}

impl TryFrom<Duration> for AveragingPeriod {
    type Error = TracerError;

    fn try_from(period: Duration) -> Result<Self, Self::Error> {
        Self::new(period)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rejects_non_positive_periods() {
        for secs in [0.0, -1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                AveragingPeriod::from_secs_f64(secs),
                Err(TracerError::InvalidArgument(_))
            ));
        }

        assert!(AveragingPeriod::new(Duration::ZERO).is_err());
        assert!(AveragingPeriod::from_millis(0).is_err());
        // Rounds down to zero nanoseconds
        assert!(AveragingPeriod::from_secs_f64(1e-12).is_err());
    }

    #[test]
    fn test_accepts_positive_periods() {
        let period = AveragingPeriod::from_secs_f64(0.25).unwrap();
        assert_eq!(period.as_duration(), Duration::from_millis(250));
        assert_eq!(
            AveragingPeriod::default().as_duration(),
            Duration::from_millis(500)
        );
        assert_eq!(AveragingPeriod::from_millis(1).unwrap().as_secs_f64(), 0.001);
    }
}
