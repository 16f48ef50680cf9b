//! Single-currency gold ledger.

use dam_defense_core::{Event, REFUND_RATIO};

/// Gold balance with spend, earn and refund rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoldManager {
    balance: u32,
    initial: u32,
    total_earned: u32,
}

impl GoldManager {
    /// Creates a ledger holding `initial` gold.
    #[must_use]
    pub fn new(initial: u32) -> Self {
        Self {
            balance: initial,
            initial,
            total_earned: 0,
        }
    }

    /// Current balance.
    #[must_use]
    pub fn balance(&self) -> u32 {
        self.balance
    }

    /// Balance the ledger was created with.
    #[must_use]
    pub fn initial(&self) -> u32 {
        self.initial
    }

    /// Gold credited since the last reset.
    #[must_use]
    pub fn total_earned(&self) -> u32 {
        self.total_earned
    }

    /// Reports whether `cost` can be paid.
    #[must_use]
    pub fn can_afford(&self, cost: u32) -> bool {
        self.balance >= cost
    }

    /// Debits `cost`. Returns `false` without touching the balance when it
    /// cannot be covered.
    pub fn spend(&mut self, cost: u32, out_events: &mut Vec<Event>) -> bool {
        let Some(balance) = self.balance.checked_sub(cost) else {
            return false;
        };
        self.balance = balance;
        out_events.push(Event::GoldChanged {
            amount: -i64::from(cost),
            total: self.balance,
        });
        true
    }

    /// Credits `amount`.
    pub fn earn(&mut self, amount: u32, out_events: &mut Vec<Event>) {
        self.balance = self.balance.saturating_add(amount);
        self.total_earned = self.total_earned.saturating_add(amount);
        out_events.push(Event::GoldChanged {
            amount: i64::from(amount),
            total: self.balance,
        });
    }

    /// Restores the initial balance and clears the earnings counter.
    pub fn reset(&mut self, out_events: &mut Vec<Event>) {
        let delta = i64::from(self.initial) - i64::from(self.balance);
        self.balance = self.initial;
        self.total_earned = 0;
        out_events.push(Event::GoldChanged {
            amount: delta,
            total: self.balance,
        });
    }

    /// Gold returned when selling a tower that cost `total_cost` in total.
    #[must_use]
    pub fn calculate_refund(total_cost: u32) -> u32 {
        (f64::from(total_cost) * f64::from(REFUND_RATIO)).floor() as u32
    }
}
