//! End-of-epoch policies: learning-rate reduction and best-checkpoint tracking.

use crate::core::constants::{PLATEAU_FACTOR, PLATEAU_MIN_DELTA, PLATEAU_PATIENCE};

/// Multiplies the learning rate by `factor` once validation loss has not
/// improved by at least `min_delta` for `patience` consecutive epochs.
#[derive(Debug, Clone)]
pub struct ReduceLrOnPlateau {
    factor: f64,
    patience: usize,
    min_delta: f64,
    min_lr: f64,
    best: f64,
    wait: usize,
}

impl Default for ReduceLrOnPlateau {
    fn default() -> Self {
        Self::new(PLATEAU_FACTOR, PLATEAU_PATIENCE, PLATEAU_MIN_DELTA)
    }
}

impl ReduceLrOnPlateau {
    pub fn new(factor: f64, patience: usize, min_delta: f64) -> Self {
        Self {
            factor,
            patience,
            min_delta,
            min_lr: 0.0,
            best: f64::INFINITY,
            wait: 0,
        }
    }

    /// Lower bound for the reduced learning rate.
    pub fn with_min_lr(mut self, min_lr: f64) -> Self {
        self.min_lr = min_lr;
        self
    }

    /// Records one epoch's validation loss.
    ///
    /// Returns the new learning rate when it should change, `None` otherwise.
    /// The wait counter only restarts after an actual reduction.
    pub fn step(&mut self, val_loss: f64, current_lr: f64) -> Option<f64> {
        if val_loss < self.best - self.min_delta {
            self.best = val_loss;
            self.wait = 0;
            return None;
        }

        self.wait += 1;
        if self.wait < self.patience || current_lr <= self.min_lr {
            return None;
        }
        self.wait = 0;
        Some((current_lr * self.factor).max(self.min_lr))
    }
}

/// Tracks the best validation accuracy so far; a checkpoint is due only on
/// strict improvement.
#[derive(Debug, Clone)]
pub struct BestCheckpoint {
    best: f64,
}

impl Default for BestCheckpoint {
    fn default() -> Self {
        Self {
            best: f64::NEG_INFINITY,
        }
    }
}

impl BestCheckpoint {
    /// Returns true and records `val_accuracy` if it beats the best so far.
    pub fn improved(&mut self, val_accuracy: f64) -> bool {
        if val_accuracy > self.best {
            self.best = val_accuracy;
            true
        } else {
            false
        }
    }

    /// Best accuracy recorded, if any epoch has been seen.
    pub fn best(&self) -> Option<f64> {
        self.best.is_finite().then_some(self.best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plateau_halves_after_two_flat_epochs() {
        let mut plateau = ReduceLrOnPlateau::default();
        let mut lr = 1e-3;
        assert_eq!(plateau.step(1.0, lr), None);
        assert_eq!(plateau.step(0.99995, lr), None); // below min_delta
        let reduced = plateau.step(1.2, lr).unwrap();
        assert!((reduced - 5e-4).abs() < 1e-12);
        lr = reduced;

        // wait counter restarts after a reduction
        assert_eq!(plateau.step(1.1, lr), None);
        assert!(plateau.step(1.1, lr).is_some());
    }

    #[test]
    fn test_plateau_improvement_resets_wait() {
        let mut plateau = ReduceLrOnPlateau::default();
        assert_eq!(plateau.step(1.0, 1e-3), None);
        assert_eq!(plateau.step(1.5, 1e-3), None);
        assert_eq!(plateau.step(0.5, 1e-3), None);
        assert_eq!(plateau.step(0.6, 1e-3), None);
        assert!(plateau.step(0.6, 1e-3).is_some());
    }

    #[test]
    fn test_plateau_respects_min_lr() {
        let mut plateau = ReduceLrOnPlateau::new(0.5, 1, 0.0).with_min_lr(4e-4);
        plateau.step(1.0, 1e-3);
        assert_eq!(plateau.step(1.0, 1e-3), Some(5e-4));
        assert_eq!(plateau.step(1.0, 5e-4), Some(4e-4));
        assert_eq!(plateau.step(1.0, 4e-4), None);
    }

    #[test]
    fn test_wait_keeps_counting_at_min_lr() {
        let mut plateau = ReduceLrOnPlateau::new(0.5, 2, 0.0).with_min_lr(4e-4);
        plateau.step(1.0, 4e-4);
        assert_eq!(plateau.step(1.0, 4e-4), None);
        assert_eq!(plateau.step(1.0, 4e-4), None);
        // patience already exhausted, so a higher rate is reduced at once
        assert_eq!(plateau.step(1.0, 1e-3), Some(5e-4));
        assert_eq!(plateau.step(1.0, 5e-4), None);
    }

    #[test]
    fn test_nan_loss_counts_as_no_improvement() {
        let mut plateau = ReduceLrOnPlateau::default();
        plateau.step(1.0, 1e-3);
        assert_eq!(plateau.step(f64::NAN, 1e-3), None);
        assert!(plateau.step(f64::NAN, 1e-3).is_some());
    }

    #[test]
    fn test_checkpoint_saves_first_epoch_and_strict_improvements() {
        let mut checkpoint = BestCheckpoint::default();
        assert_eq!(checkpoint.best(), None);
        assert!(checkpoint.improved(0.0));
        assert!(!checkpoint.improved(0.0));
        assert!(checkpoint.improved(0.4));
        assert!(!checkpoint.improved(0.3));
        assert!(!checkpoint.improved(0.4));
        assert_eq!(checkpoint.best(), Some(0.4));
    }
}
