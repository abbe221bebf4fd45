//! The assembled profile page.

use std::sync::Arc;

use autosave_config::AutosaveConfig;
use autosave_core::{FieldSubmitter, FormSession, Gateways, OptionSource};
use tracing::{info, warn};

use crate::bank::{BankAccountEditor, BankAccountGateway};
use crate::customer::{CustomerBaselines, CustomerSource};
use crate::forms::{ADDRESS, BIODATA};

/// Collaborators required by the profile page.
#[derive(Clone)]
pub struct ProfileGateways {
    /// Accepts single-field profile updates.
    pub submitter: Arc<dyn FieldSubmitter>,
    /// Loads the customer record.
    pub customer: Arc<dyn CustomerSource>,
    /// Loads master-data option lists.
    pub options: Arc<dyn OptionSource>,
    /// Manages saved bank accounts.
    pub bank: Arc<dyn BankAccountGateway>,
}

/// Biodata and address sessions plus the bank-account editor.
///
/// Each section owns its state and event bus; they only share the customer
/// record fetch.
pub struct ProfilePage {
    biodata: FormSession,
    address: FormSession,
    bank: BankAccountEditor,
}

impl ProfilePage {
    /// Mount every section concurrently.
    pub async fn mount(gateways: ProfileGateways, config: AutosaveConfig) -> Self {
        let sessions = Gateways {
            submitter: gateways.submitter,
            baseline: Arc::new(CustomerBaselines::new(gateways.customer)),
            options: Arc::clone(&gateways.options),
        };
        let bank = BankAccountEditor::new(gateways.bank, gateways.options, config);

        let (biodata, address, banks, accounts) = tokio::join!(
            FormSession::mount(&BIODATA, sessions.clone(), config),
            FormSession::mount(&ADDRESS, sessions, config),
            bank.load_banks(),
            bank.refresh(),
        );
        if let Err(err) = banks {
            warn!(error = %err, "bank list unavailable");
        }
        if let Err(err) = accounts {
            warn!(error = %err, "saved bank accounts unavailable");
        }
        info!("profile page mounted");

        Self {
            biodata,
            address,
            bank,
        }
    }

    /// Personal details section.
    #[must_use]
    pub const fn biodata(&self) -> &FormSession {
        &self.biodata
    }

    /// Domicile section.
    #[must_use]
    pub const fn address(&self) -> &FormSession {
        &self.address
    }

    /// Bank-account editor.
    #[must_use]
    pub const fn bank(&self) -> &BankAccountEditor {
        &self.bank
    }

    /// Wait for background submissions in every section.
    pub async fn settle(&self) {
        tokio::join!(self.biodata.settle(), self.address.settle());
    }

    /// Close every section.
    pub fn close(&self) {
        self.biodata.close();
        self.address.close();
    }
}
