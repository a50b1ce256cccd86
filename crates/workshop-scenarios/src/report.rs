//! Progress narration for the human operator. Step banners and summaries go
//! through tracing; nothing here is state-bearing or machine-parseable.

use std::fmt;

use tracing::info;

use workshop_horizon::AccountRecord;

#[derive(Default)]
pub struct Reporter {
    step: u32,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the next numbered step.
    pub fn step(&mut self, title: &str) {
        self.step += 1;
        info!(step = self.step, "==== {title} ====");
    }

    pub fn note(&self, message: &str) {
        info!("{message}");
    }

    pub fn detail(&self, label: &str, value: &dyn fmt::Display) {
        info!("{label}: {value}");
    }

    /// Print every balance line of an account.
    pub fn balances(&self, owner: &str, account: &AccountRecord) {
        for line in &account.balances {
            info!(
                owner,
                asset = %line.label(),
                balance = %line.balance(),
                "balance"
            );
        }
    }

    /// Closing summary block.
    pub fn summary(&self, items: &[(&str, String)]) {
        info!("==== Summary ====");
        for (label, value) in items {
            info!("{label}: {value}");
        }
    }
}
