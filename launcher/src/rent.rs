//! Rent lookup and cost estimation for market creation.

use mintforge_sdk::client::{ClientError, RpcConnection};
use mintforge_sdk::programs::{MINT_SIZE, TOKEN_ACCOUNT_SIZE};
use mintforge_sdk::types::lamports_to_sol;
use mintforge_sdk::MarketAccountSizes;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rent-exempt minimum, in lamports, for each account class a market needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentSchedule {
    /// Account sizes the rent was looked up for.
    pub sizes: MarketAccountSizes,
    /// Mint account. Zero when the market reuses existing mints.
    pub mint: u64,
    /// Token vault.
    pub vault: u64,
    /// Market state account.
    pub market: u64,
    /// Event queue.
    pub event_queue: u64,
    /// Request queue.
    pub request_queue: u64,
    /// One side of the order book.
    pub orderbook: u64,
}

impl RentSchedule {
    /// Queries the cluster once per distinct account class.
    ///
    /// # Errors
    ///
    /// Returns the first RPC error.
    pub async fn fetch<C: RpcConnection>(
        connection: &C,
        sizes: &MarketAccountSizes,
        create_mints: bool,
    ) -> Result<Self, ClientError> {
        let mint = if create_mints {
            connection
                .get_minimum_balance_for_rent_exemption(MINT_SIZE)
                .await?
        } else {
            0
        };

        Ok(Self {
            sizes: *sizes,
            mint,
            vault: connection
                .get_minimum_balance_for_rent_exemption(TOKEN_ACCOUNT_SIZE)
                .await?,
            market: connection
                .get_minimum_balance_for_rent_exemption(sizes.market)
                .await?,
            event_queue: connection
                .get_minimum_balance_for_rent_exemption(sizes.event_queue)
                .await?,
            request_queue: connection
                .get_minimum_balance_for_rent_exemption(sizes.request_queue)
                .await?,
            orderbook: connection
                .get_minimum_balance_for_rent_exemption(sizes.orderbook)
                .await?,
        })
    }

    /// Returns true if the schedule was looked up for `sizes`.
    #[must_use]
    pub fn covers(&self, sizes: &MarketAccountSizes) -> bool {
        self.sizes == *sizes
    }

    /// Total rent for a market: two vaults, two order book sides, the three
    /// queues and state account, plus two mints when they are created.
    #[must_use]
    pub fn market_total(&self) -> u64 {
        self.mint
            .saturating_mul(2)
            .saturating_add(self.vault.saturating_mul(2))
            .saturating_add(self.market)
            .saturating_add(self.event_queue)
            .saturating_add(self.request_queue)
            .saturating_add(self.orderbook.saturating_mul(2))
    }
}

/// Estimated cost of creating a market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    /// Account sizes in bytes.
    pub sizes: MarketAccountSizes,
    /// Rent per account class.
    pub rent: RentSchedule,
    /// Platform fee in lamports.
    pub platform_fee: u64,
}

impl CostEstimate {
    /// Total rent in lamports.
    #[must_use]
    pub fn rent_total(&self) -> u64 {
        self.rent.market_total()
    }

    /// Total cost in lamports.
    #[must_use]
    pub fn total_lamports(&self) -> u64 {
        self.rent_total().saturating_add(self.platform_fee)
    }

    /// Total cost in SOL.
    #[must_use]
    pub fn total_sol(&self) -> Decimal {
        lamports_to_sol(self.total_lamports())
    }
}

#[cfg(test)]
mod tests {
    use mintforge_sdk::QueueLengths;

    use super::*;
    use crate::test_utils::{rent_for, MockCall, MockConnection};

    #[tokio::test]
    async fn test_rent_fetch_existing_mints() {
        let connection = MockConnection::new();
        let sizes = MarketAccountSizes::compute(&QueueLengths::minimum()).expect("sizes");

        let rent = RentSchedule::fetch(&connection, &sizes, false)
            .await
            .expect("rent");

        assert_eq!(rent.mint, 0);
        assert!(rent.covers(&sizes));
        assert_eq!(rent.vault, rent_for(TOKEN_ACCOUNT_SIZE));
        assert_eq!(rent.event_queue, rent_for(11_308));
        assert_eq!(rent.orderbook, rent_for(14_524));

        let calls = connection.calls();
        assert_eq!(calls.len(), 5);
        assert!(!calls.contains(&MockCall::Rent(MINT_SIZE)));
    }

    #[test]
    fn test_rent_fetch_new_mints() {
        let connection = MockConnection::new();
        let sizes = MarketAccountSizes::compute(&QueueLengths::default()).expect("sizes");

        let rent = tokio_test::block_on(RentSchedule::fetch(&connection, &sizes, true))
            .expect("rent");

        assert_eq!(rent.mint, rent_for(MINT_SIZE));
        assert_eq!(connection.calls().len(), 6);

        let minimum = MarketAccountSizes::compute(&QueueLengths::minimum()).expect("sizes");
        assert!(!rent.covers(&minimum));
    }

    fn default_sizes() -> MarketAccountSizes {
        MarketAccountSizes::compute(&QueueLengths::default()).expect("sizes")
    }

    #[test]
    fn test_market_total() {
        let rent = RentSchedule {
            sizes: default_sizes(),
            mint: 1,
            vault: 10,
            market: 100,
            event_queue: 1_000,
            request_queue: 10_000,
            orderbook: 100_000,
        };
        assert_eq!(rent.market_total(), 2 + 20 + 100 + 1_000 + 10_000 + 200_000);
    }

    #[test]
    fn test_cost_estimate_totals() {
        let estimate = CostEstimate {
            sizes: default_sizes(),
            rent: RentSchedule {
                sizes: default_sizes(),
                mint: 0,
                vault: 500_000_000,
                market: 0,
                event_queue: 0,
                request_queue: 0,
                orderbook: 0,
            },
            platform_fee: 1_500_000_000,
        };

        assert_eq!(estimate.rent_total(), 1_000_000_000);
        assert_eq!(estimate.total_lamports(), 2_500_000_000);
        assert_eq!(estimate.total_sol().to_string(), "2.5");
    }
}
