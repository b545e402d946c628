use sleuth_protocol::HpStatus;

/// Hit points. Exact for our own pokemon, out of 100 for the opponent's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hp {
    current: u32,
    max: u32,
    exact: bool,
}

impl Hp {
    /// Full HP on the percentage scale
    pub fn percent() -> Self {
        Hp {
            current: 100,
            max: 100,
            exact: false,
        }
    }

    pub fn exact(current: u32, max: u32) -> Self {
        Hp {
            current: current.min(max),
            max,
            exact: true,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_exact(&self) -> bool {
        self.exact
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    pub fn is_fainted(&self) -> bool {
        self.current == 0
    }

    pub fn set(&mut self, current: u32, max: u32) {
        if max > 0 {
            self.max = max;
        }
        self.current = current.min(self.max);
    }

    /// Apply an `HP STATUS` field from a protocol message
    pub fn apply(&mut self, status: &HpStatus) {
        if status.is_fainted() {
            self.current = 0;
        } else {
            self.set(status.current, status.max);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_hp_status() {
        let mut hp = Hp::percent();
        hp.apply(&HpStatus::parse("63/100").unwrap());
        assert_eq!(hp.current(), 63);
        assert!(!hp.is_full());

        hp.apply(&HpStatus::parse("0 fnt").unwrap());
        assert!(hp.is_fainted());
        assert_eq!(hp.max(), 100);
    }
}
