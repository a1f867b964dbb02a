use rand::Rng;

/// Stand-in for a bank verification API: approves a fixed share of payments at random.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FraudCheck {
    approved: u32,
    out_of: u32,
}

impl FraudCheck {
    /// `approved` out of every `out_of` payments pass, `approved <= out_of`, `out_of > 0`.
    pub const fn new(approved: u32, out_of: u32) -> Self {
        assert!(out_of > 0 && approved <= out_of);
        Self { approved, out_of }
    }

    pub fn approve(&self) -> bool {
        rand::thread_rng().gen_ratio(self.approved, self.out_of)
    }
}

impl Default for FraudCheck {
    fn default() -> Self {
        Self::new(2, 3)
    }
}
