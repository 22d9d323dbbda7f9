use std::time::Duration;

/// Charges available at the start of a run, and the most that can be held
pub const MAX_CHARGES: u8 = 2;
/// How long a pulse keeps the surroundings revealed
pub const BOOST_DURATION: Duration = Duration::from_millis(1500);
/// One charge comes back on this interval, whether or not any were spent
pub const RECHARGE_INTERVAL: Duration = Duration::from_secs(5);

/// Consumable sonar pulses. Clearing the boost is left to whoever owns the
/// clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sonar {
    charges: u8,
    active: bool,
}

impl Sonar {
    pub fn new() -> Self {
        Self {
            charges: MAX_CHARGES,
            active: false,
        }
    }

    pub fn charges(&self) -> u8 {
        self.charges
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Spend a charge and start the boost. Returns false when empty.
    pub fn fire(&mut self) -> bool {
        if self.charges == 0 {
            return false;
        }
        self.charges -= 1;
        self.active = true;
        true
    }

    pub fn recharge(&mut self) {
        self.charges = (self.charges + 1).min(MAX_CHARGES);
    }

    pub fn clear_boost(&mut self) {
        self.active = false;
    }
}

impl Default for Sonar {
    fn default() -> Self {
        Self::new()
    }
}
