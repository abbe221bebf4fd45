//! Bank-account editor.
//!
//! Unlike the autosaved sections, bank accounts are edited as whole records and
//! saved explicitly. The editor reuses the engine's descriptors, validator and
//! option cache, and reports results as global notices on its own event bus.
//!
//! # Design
//! - `save` creates a record unless an existing one was opened with
//!   `begin_edit`, in which case it updates that record in place.
//! - A successful save or delete clears the draft and refreshes the saved list.
//!   A record opened with `begin_edit` while the save was in flight is kept.
//! - Confirmation prompts belong to the UI layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use autosave_config::AutosaveConfig;
use autosave_core::{
    EventBus, EventStream, FieldDescriptor, GatewayError, LoadError, NoticeKind, OptionCatalog,
    OptionList, OptionSource, PayloadPart, PayloadValue, RawValue, Rule, SessionEvent,
    ValidationResult, Validator, GENERIC_FAILURE,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ProfileError, ProfileResult};
use crate::forms::BANK;

const FORM: &str = "bank";
const SAVED: &str = "Rekening berhasil disimpan";
const UPDATED: &str = "Perubahan Rekening berhasil disimpan";
const DELETED: &str = "Rekening telah dihapus";

/// Bank-account fields.
pub static FIELDS: [FieldDescriptor; 3] = [
    FieldDescriptor::new("bank", "MST_BANK_ID")
        .rules(&[Rule::Required("Bank harus dipilih!")])
        .options(BANK),
    FieldDescriptor::new("accountNumber", "CUSTOMER_BANK_ACCOUNT_NUMBER")
        .rules(&[Rule::Required("Nomor Rekening harus disi!")]),
    FieldDescriptor::new("accountName", "CUSTOMER_BANK_ACCOUNT_NAME")
        .rules(&[Rule::Required("Nama Pemilik Rekening harus disi!")])
        .upper(),
];

/// Saved bank account as listed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    /// Record id.
    #[serde(rename = "CUSTOMER_BANK_ID")]
    pub id: String,
    /// Bank id from the master list.
    #[serde(rename = "MST_BANK_ID")]
    pub bank_id: String,
    /// Bank display name.
    #[serde(rename = "MST_BANK_DESKRIPSI", default)]
    pub bank_name: Option<String>,
    /// Account number.
    #[serde(rename = "CUSTOMER_BANK_ACCOUNT_NUMBER")]
    pub account_number: String,
    /// Account holder name.
    #[serde(rename = "CUSTOMER_BANK_ACCOUNT_NAME")]
    pub account_name: String,
}

/// Server operations on saved bank accounts.
#[async_trait]
pub trait BankAccountGateway: Send + Sync {
    /// List the customer's saved accounts.
    async fn list_accounts(&self) -> Result<Vec<BankAccount>, GatewayError>;
    /// Create or update an account; updates carry `_method=PUT` and `cust_bank_id`.
    async fn save_account(&self, parts: Vec<PayloadPart>) -> Result<(), GatewayError>;
    /// Delete the account with `id`.
    async fn delete_account(&self, id: &str) -> Result<(), GatewayError>;
}

/// Result of an editor action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankOutcome {
    /// A new account was stored.
    Created,
    /// The opened account was updated.
    Updated,
    /// The account was deleted.
    Deleted,
    /// The draft failed validation; nothing was sent.
    Invalid,
    /// The server call failed; the draft is kept.
    Failed,
}

#[derive(Default)]
struct Draft {
    values: HashMap<&'static str, RawValue>,
    errors: HashMap<&'static str, &'static str>,
    editing: Option<BankAccount>,
    accounts: Vec<BankAccount>,
}

/// Record-level editor for the customer's bank accounts.
pub struct BankAccountEditor {
    gateway: Arc<dyn BankAccountGateway>,
    catalog: OptionCatalog,
    validator: Validator,
    bus: EventBus,
    draft: Mutex<Draft>,
}

impl BankAccountEditor {
    /// Editor backed by `gateway`, drawing the bank list from `options`.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn BankAccountGateway>,
        options: Arc<dyn OptionSource>,
        config: AutosaveConfig,
    ) -> Self {
        Self {
            gateway,
            catalog: OptionCatalog::new(options),
            validator: Validator::new(config.max_upload_bytes),
            bus: EventBus::new(Uuid::new_v4(), FORM, config.event_buffer),
            draft: Mutex::new(Draft::default()),
        }
    }

    /// Subscribe to save and delete notices.
    #[must_use]
    pub fn subscribe(&self, since: Option<u64>) -> EventStream {
        self.bus.subscribe(since)
    }

    /// Load (or retry) the bank master list.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Options`] when the list cannot be fetched.
    pub async fn load_banks(&self) -> Result<OptionList, LoadError> {
        self.catalog.load(BANK).await
    }

    /// Set a draft field.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::UnknownField`] for undeclared names.
    pub fn set(&self, field: &str, value: impl Into<RawValue>) -> ProfileResult<()> {
        let descriptor = descriptor(field)?;
        let mut draft = self.draft();
        draft.values.insert(descriptor.name, value.into());
        draft.errors.remove(descriptor.name);
        Ok(())
    }

    /// Current draft value of `field`.
    #[must_use]
    pub fn value(&self, field: &str) -> RawValue {
        self.draft().values.get(field).cloned().unwrap_or_default()
    }

    /// Inline error for `field`, if the last save rejected it.
    #[must_use]
    pub fn error(&self, field: &str) -> Option<&'static str> {
        self.draft().errors.get(field).copied()
    }

    /// Account currently opened for editing.
    #[must_use]
    pub fn editing(&self) -> Option<BankAccount> {
        self.draft().editing.clone()
    }

    /// Saved accounts as of the last refresh.
    #[must_use]
    pub fn accounts(&self) -> Vec<BankAccount> {
        self.draft().accounts.clone()
    }

    /// Open `account` for editing, copying its values into the draft.
    pub fn begin_edit(&self, account: &BankAccount) {
        let mut draft = self.draft();
        draft.values = HashMap::from([
            ("bank", RawValue::text(account.bank_id.clone())),
            ("accountNumber", RawValue::text(account.account_number.clone())),
            ("accountName", RawValue::text(account.account_name.clone())),
        ]);
        draft.errors.clear();
        draft.editing = Some(account.clone());
    }

    /// Drop the draft and leave edit mode.
    pub fn cancel(&self) {
        let mut draft = self.draft();
        draft.values.clear();
        draft.errors.clear();
        draft.editing = None;
    }

    /// Validate the draft and create or update the account.
    pub async fn save(&self) -> BankOutcome {
        let (parts, editing) = {
            let mut draft = self.draft();
            let mut errors = HashMap::new();
            let mut parts = Vec::with_capacity(FIELDS.len() + 2);
            for field in &FIELDS {
                let value = draft.values.get(field.name).cloned().unwrap_or_default();
                if let ValidationResult::Invalid(message) = self.validator.validate(field, &value)
                {
                    errors.insert(field.name, message);
                }
                parts.push(field.encode(&value));
            }
            if !errors.is_empty() {
                draft.errors = errors;
                return BankOutcome::Invalid;
            }
            if let Some(account) = &draft.editing {
                parts.push(text_part("_method", "PUT"));
                parts.push(text_part("cust_bank_id", &account.id));
            }
            (parts, draft.editing.as_ref().map(|account| account.id.clone()))
        };

        match self.gateway.save_account(parts).await {
            Ok(()) => {
                let (outcome, message) = if editing.is_some() {
                    (BankOutcome::Updated, UPDATED)
                } else {
                    (BankOutcome::Created, SAVED)
                };
                info!(account = ?editing, ?outcome, "bank account saved");
                self.clear_if_editing(editing.as_deref());
                self.notice(NoticeKind::Success, message);
                self.refresh_quietly().await;
                outcome
            }
            Err(err) => {
                warn!(account = ?editing, error = %err, "bank account save failed");
                self.notice(NoticeKind::Error, GENERIC_FAILURE);
                BankOutcome::Failed
            }
        }
    }

    /// Delete the account with `id`.
    pub async fn delete(&self, id: &str) -> BankOutcome {
        match self.gateway.delete_account(id).await {
            Ok(()) => {
                info!(account = id, "bank account deleted");
                if self
                    .draft()
                    .editing
                    .as_ref()
                    .is_some_and(|account| account.id == id)
                {
                    self.cancel();
                }
                self.notice(NoticeKind::Success, DELETED);
                self.refresh_quietly().await;
                BankOutcome::Deleted
            }
            Err(err) => {
                warn!(account = id, error = %err, "bank account delete failed");
                self.notice(NoticeKind::Error, GENERIC_FAILURE);
                BankOutcome::Failed
            }
        }
    }

    /// Reload the saved-account list.
    ///
    /// # Errors
    ///
    /// Returns the collaborator failure; the previous list is kept.
    pub async fn refresh(&self) -> Result<(), GatewayError> {
        let accounts = self.gateway.list_accounts().await?;
        self.draft().accounts = accounts;
        Ok(())
    }

    // Leaves a draft alone if another record was opened while the save ran.
    fn clear_if_editing(&self, id: Option<&str>) {
        let mut draft = self.draft();
        if draft.editing.as_ref().map(|account| account.id.as_str()) == id {
            draft.values.clear();
            draft.errors.clear();
            draft.editing = None;
        }
    }

    async fn refresh_quietly(&self) {
        if let Err(err) = self.refresh().await {
            warn!(error = %err, "bank account list refresh failed");
        }
    }

    fn notice(&self, kind: NoticeKind, message: &str) {
        self.bus.publish(SessionEvent::Notice {
            kind,
            message: message.to_string(),
        });
    }

    fn draft(&self) -> MutexGuard<'_, Draft> {
        self.draft.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn descriptor(field: &str) -> ProfileResult<&'static FieldDescriptor> {
    FIELDS
        .iter()
        .find(|descriptor| descriptor.name == field)
        .ok_or_else(|| ProfileError::UnknownField {
            field: field.to_string(),
        })
}

fn text_part(key: &'static str, value: &str) -> PayloadPart {
    PayloadPart {
        key,
        value: PayloadValue::Text(value.to_string()),
    }
}
