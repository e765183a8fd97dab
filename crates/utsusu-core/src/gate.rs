//! Free-trial counter and plan flag deciding whether a conversion may start.
//!
//! This is advisory client state. A deployment that charges money needs the
//! same decision made by a server it trusts.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Conversions allowed before a plan is required
pub const FREE_LIMIT: u32 = 1;

/// Conversions included in a monthly plan (shown, not enforced)
pub const MONTHLY_LIMIT: u32 = 30;

/// Limits the gate works with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateLimits {
    pub free_limit: u32,
    pub monthly_limit: u32,
}

impl Default for GateLimits {
    fn default() -> Self {
        Self {
            free_limit: FREE_LIMIT,
            monthly_limit: MONTHLY_LIMIT,
        }
    }
}

/// What the sidebar shows about remaining usage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageSummary {
    /// Unpaid, trial conversions left
    Trial { remaining: u32 },
    /// Unpaid, trial used up
    TrialUsed,
    /// On a plan
    Plan { remaining: u32, limit: u32 },
}

impl UsageSummary {
    pub fn label(&self) -> String {
        match self {
            UsageSummary::Trial { remaining } => format!("お試し {} 回", remaining),
            UsageSummary::TrialUsed => "プランに登録".to_string(),
            UsageSummary::Plan { remaining, limit } => {
                format!("残り {} / {} 動画", remaining, limit)
            }
        }
    }
}

/// Usage counter and entitlement flag of one session
#[derive(Debug, Clone, Default)]
pub struct UsageGate {
    limits: GateLimits,
    is_paid: bool,
    usage_count: u32,
}

impl UsageGate {
    pub fn new(limits: GateLimits) -> Self {
        Self {
            limits,
            is_paid: false,
            usage_count: 0,
        }
    }

    /// Whether a new conversion may start.
    pub fn can_proceed(&self) -> bool {
        self.is_paid || self.usage_count < self.limits.free_limit
    }

    /// Like [`can_proceed`](Self::can_proceed), but as a `Result` for `?`.
    pub fn check(&self) -> Result<()> {
        if self.can_proceed() {
            Ok(())
        } else {
            tracing::warn!(
                used = self.usage_count,
                limit = self.limits.free_limit,
                "Free trial exhausted"
            );
            Err(Error::EntitlementDenied {
                used: self.usage_count,
                limit: self.limits.free_limit,
            })
        }
    }

    /// Count one successful conversion. Not called for failed or cancelled runs.
    pub fn record_usage(&mut self) {
        self.usage_count = self.usage_count.saturating_add(1);
    }

    /// Mark the session as subscribed.
    pub fn grant_entitlement(&mut self) {
        tracing::info!("Plan activated");
        self.is_paid = true;
    }

    pub fn is_paid(&self) -> bool {
        self.is_paid
    }

    pub fn usage_count(&self) -> u32 {
        self.usage_count
    }

    pub fn limits(&self) -> GateLimits {
        self.limits
    }

    pub fn summary(&self) -> UsageSummary {
        if self.is_paid {
            UsageSummary::Plan {
                remaining: self.limits.monthly_limit.saturating_sub(self.usage_count),
                limit: self.limits.monthly_limit,
            }
        } else if self.usage_count >= self.limits.free_limit {
            UsageSummary::TrialUsed
        } else {
            UsageSummary::Trial {
                remaining: self.limits.free_limit - self.usage_count,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_gate_allows_trial() {
        let gate = UsageGate::default();
        assert!(gate.can_proceed());
        assert_eq!(gate.summary(), UsageSummary::Trial { remaining: 1 });
        assert_eq!(gate.summary().label(), "お試し 1 回");
    }

    #[test]
    fn test_blocks_after_free_limit() {
        let mut gate = UsageGate::new(GateLimits {
            free_limit: 3,
            monthly_limit: 30,
        });
        for _ in 0..3 {
            assert!(gate.can_proceed());
            gate.record_usage();
        }
        assert!(!gate.can_proceed());
        assert_eq!(
            gate.check(),
            Err(Error::EntitlementDenied { used: 3, limit: 3 })
        );
        assert_eq!(gate.summary().label(), "プランに登録");
    }

    #[test]
    fn test_paid_ignores_usage() {
        let mut gate = UsageGate::default();
        gate.record_usage();
        gate.record_usage();
        gate.grant_entitlement();
        assert!(gate.can_proceed());
        assert_eq!(
            gate.summary(),
            UsageSummary::Plan {
                remaining: 28,
                limit: 30
            }
        );
    }

    #[test]
    fn test_monthly_limit_is_display_only() {
        let mut gate = UsageGate::new(GateLimits {
            free_limit: 1,
            monthly_limit: 2,
        });
        gate.grant_entitlement();
        for _ in 0..5 {
            gate.record_usage();
        }
        assert!(gate.can_proceed());
        assert_eq!(gate.summary().label(), "残り 0 / 2 動画");
    }

    #[test]
    fn test_zero_free_limit_requires_plan() {
        let gate = UsageGate::new(GateLimits {
            free_limit: 0,
            monthly_limit: 30,
        });
        assert!(!gate.can_proceed());
    }
}
