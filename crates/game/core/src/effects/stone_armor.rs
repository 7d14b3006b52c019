//! Stone armor: a racial passive granting bonus armor that permanently
//! degrades as hits land.

/// Report of one degradation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DegradationReport {
    /// Armor value after the hit.
    pub value: i32,
    /// True exactly when this hit drove the value down to the minimum.
    pub destroyed: bool,
}

/// Degrading bonus armor.
///
/// The value is clamped at the configured minimum and never increases after
/// initialization. Once at the minimum the armor is spent: it contributes
/// nothing and no longer degrades.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoneArmor {
    value: i32,
    minimum: i32,
    degradation_per_hit: i32,
}

impl StoneArmor {
    pub fn new(value: i32, minimum: i32, degradation_per_hit: i32) -> Self {
        Self {
            value: value.max(minimum),
            minimum,
            degradation_per_hit,
        }
    }

    /// Current armor contribution. Zero once destroyed.
    pub fn armor_value(&self) -> i32 {
        if self.is_intact() { self.value } else { 0 }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn is_intact(&self) -> bool {
        self.value > self.minimum
    }

    /// Degrades the armor for one nonzero hit taken.
    ///
    /// Returns `None` when the armor was already spent before the hit.
    pub fn degrade(&mut self) -> Option<DegradationReport> {
        if !self.is_intact() {
            return None;
        }

        self.value = (self.value - self.degradation_per_hit).max(self.minimum);
        Some(DegradationReport {
            value: self.value,
            destroyed: self.value == self.minimum,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrades_by_fixed_amount_per_hit() {
        let mut armor = StoneArmor::new(5, 0, 1);

        for expected in [4, 3, 2] {
            let report = armor.degrade().unwrap();
            assert_eq!(report.value, expected);
            assert!(!report.destroyed);
        }
    }

    #[test]
    fn reports_destroyed_exactly_once() {
        let mut armor = StoneArmor::new(2, 0, 1);

        assert!(!armor.degrade().unwrap().destroyed);
        let last = armor.degrade().unwrap();
        assert!(last.destroyed);
        assert_eq!(last.value, 0);

        // Spent armor neither degrades nor contributes.
        assert_eq!(armor.degrade(), None);
        assert_eq!(armor.armor_value(), 0);
    }

    #[test]
    fn never_drops_below_minimum() {
        let mut armor = StoneArmor::new(3, 2, 5);
        let report = armor.degrade().unwrap();
        assert_eq!(report.value, 2);
        assert!(report.destroyed);
    }
}
