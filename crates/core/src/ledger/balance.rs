//! Running balance bookkeeping for ledger listings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Running balance after one line of a listing.
///
/// - previous_balance: balance before this line
/// - current_balance: balance after this line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningBalance {
    /// Number of lines accumulated so far.
    pub line_count: u64,
    /// Balance before the last line.
    pub previous_balance: Decimal,
    /// Balance after the last line.
    pub current_balance: Decimal,
}

impl RunningBalance {
    /// Starts a new accumulation at zero.
    #[must_use]
    pub fn start() -> Self {
        Self::default()
    }

    /// Accumulates one more line.
    ///
    /// - current_balance[N] = previous_balance[N] + change
    /// - previous_balance[N] = current_balance[N-1]
    #[must_use]
    pub fn next(self, change: Decimal) -> Self {
        Self {
            line_count: self.line_count + 1,
            previous_balance: self.current_balance,
            current_balance: self.current_balance + change,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    /// Strategy for generating balance changes (can be positive or negative)
    fn balance_change_strategy() -> impl Strategy<Value = Decimal> {
        (-100_000i64..100_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The final balance equals the sum of all changes.
        #[test]
        fn prop_final_balance_equals_sum_of_changes(
            changes in prop::collection::vec(balance_change_strategy(), 1..=20),
        ) {
            let rb = changes.iter().fold(RunningBalance::start(), |rb, c| rb.next(*c));
            let expected: Decimal = changes.iter().copied().sum();
            prop_assert_eq!(rb.current_balance, expected);
            prop_assert_eq!(rb.line_count as usize, changes.len());
        }

        /// previous_balance[N] equals current_balance[N-1].
        #[test]
        fn prop_previous_equals_prior_current(
            change1 in balance_change_strategy(),
            change2 in balance_change_strategy(),
        ) {
            let rb1 = RunningBalance::start().next(change1);
            let rb2 = rb1.next(change2);
            prop_assert_eq!(rb2.previous_balance, rb1.current_balance);
        }
    }

    #[test]
    fn test_running_balance_chain() {
        let rb1 = RunningBalance::start().next(dec!(100));
        assert_eq!(rb1.current_balance, dec!(100));

        let rb2 = rb1.next(dec!(50));
        assert_eq!(rb2.previous_balance, dec!(100));
        assert_eq!(rb2.current_balance, dec!(150));

        let rb3 = rb2.next(dec!(-30));
        assert_eq!(rb3.line_count, 3);
        assert_eq!(rb3.current_balance, dec!(120));
    }
}
