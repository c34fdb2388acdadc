//! Cash and share ledger for one simulated run.
//!
//! Every trade prices at the clock's current phase, so callers sequence
//! phase changes around their trades.

use tracing::debug;

use super::error::RetireSimError;
use super::market::MarketClock;

#[derive(Debug, Clone)]
pub struct Account<'a> {
    cash: f64,
    shares: u64,
    market: MarketClock<'a>,
}

impl<'a> Account<'a> {
    pub fn new(starting_cash: f64, market: MarketClock<'a>) -> Self {
        Account {
            cash: starting_cash,
            shares: 0,
            market,
        }
    }

    pub fn cash_available(&self) -> f64 {
        self.cash
    }

    pub fn shares_owned(&self) -> u64 {
        self.shares
    }

    pub fn market(&self) -> &MarketClock<'a> {
        &self.market
    }

    pub fn market_mut(&mut self) -> &mut MarketClock<'a> {
        &mut self.market
    }

    /// Buy at the current price. Callers check affordability first; an
    /// unaffordable buy is a logic error, reported as `InsufficientFunds`.
    pub fn buy_stock(&mut self, num_shares: u64) -> Result<(), RetireSimError> {
        let price = self.market.current_price();
        let cost = price * num_shares as f64;
        debug!(num_shares, price, "buy");
        if cost > self.cash {
            return Err(RetireSimError::InsufficientFunds {
                cost,
                cash: self.cash,
            });
        }
        self.cash -= cost;
        self.shares += num_shares;
        Ok(())
    }

    /// Sell at the current price. Returns `false` without touching the ledger
    /// if fewer than `num_shares` are held.
    pub fn sell_stock(&mut self, num_shares: u64) -> bool {
        let price = self.market.current_price();
        if self.shares < num_shares {
            debug!(num_shares, held = self.shares, price, "sell rejected");
            return false;
        }
        self.cash += price * num_shares as f64;
        self.shares -= num_shares;
        debug!(
            num_shares,
            price,
            remaining = self.shares,
            net_worth = self.net_worth(),
            "sell"
        );
        true
    }

    /// Returns `false` without touching the ledger if cash is short.
    pub fn spend_cash(&mut self, amount: f64) -> bool {
        if self.cash < amount {
            return false;
        }
        self.cash -= amount;
        true
    }

    /// Nominal value at the current phase's price.
    pub fn net_worth(&self) -> f64 {
        self.cash + self.shares as f64 * self.market.current_price()
    }
}
