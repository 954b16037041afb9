//! In-memory ledger for tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

use crate::address::Address;
use crate::error::{Error, Result};
use crate::ledger::{AccountSnapshot, LedgerGateway};

/// Ledger answering from a fixed table; unknown accounts fail like a dead RPC
#[derive(Default)]
pub struct StubLedger {
    accounts: Mutex<HashMap<Address, AccountSnapshot>>,
    calls: AtomicUsize,
}

impl StubLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) what the ledger reports for `address`
    pub fn set(&self, address: &str, balance: f64, tx_count: u64) {
        let address = Address::parse(address).expect("stub address");
        self.accounts
            .lock()
            .unwrap()
            .insert(address, AccountSnapshot { balance, tx_count });
    }

    /// Number of `account` lookups served or failed
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerGateway for StubLedger {
    async fn account(&self, address: &Address) -> Result<AccountSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.accounts
            .lock()
            .unwrap()
            .get(address)
            .copied()
            .ok_or_else(|| Error::RpcConnection(format!("no route to ledger for {}", address)))
    }

    async fn is_connected(&self) -> bool {
        true
    }
}

/// Ledger whose lookup for one address parks until [`GatedLedger::release`]
///
/// Every other address is answered by the wrapped [`StubLedger`] at once.
pub struct GatedLedger {
    inner: StubLedger,
    gated: Address,
    entered: Notify,
    release: Notify,
}

impl GatedLedger {
    pub fn new(inner: StubLedger, gated: &str) -> Self {
        Self {
            inner,
            gated: Address::parse(gated).expect("stub address"),
            entered: Notify::new(),
            release: Notify::new(),
        }
    }

    /// Wait until a lookup for the gated address is parked
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    /// Let the parked lookup finish
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl LedgerGateway for GatedLedger {
    async fn account(&self, address: &Address) -> Result<AccountSnapshot> {
        if *address == self.gated {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.inner.account(address).await
    }

    async fn is_connected(&self) -> bool {
        true
    }
}
