//! Customer record and the baseline adapter that feeds every profile section.
//!
//! The profile endpoint returns one record for the whole page. Sections load
//! their baseline independently, so the adapter fetches the record once and
//! serves each section its slice; a failed fetch is not cached and the next
//! section (or a reload) retries.

use std::sync::Arc;

use async_trait::async_trait;
use autosave_core::{Baseline, BaselineSource, GatewayError};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::{ProfileError, ProfileResult};
use crate::forms::{ADDRESS, BIODATA};

/// Customer record as returned by the profile endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// First name.
    #[serde(default, deserialize_with = "text_or_number")]
    pub nama_depan: Option<String>,
    /// Last name.
    #[serde(default, deserialize_with = "text_or_number")]
    pub nama_belakang: Option<String>,
    /// Email address.
    #[serde(default, deserialize_with = "text_or_number")]
    pub email: Option<String>,
    /// Personal phone number.
    #[serde(default, deserialize_with = "text_or_number")]
    pub no_telp_pribadi: Option<String>,
    /// National identity number (NIK).
    #[serde(default, deserialize_with = "text_or_number")]
    pub no_ktp: Option<String>,
    /// Occupation id.
    #[serde(default, deserialize_with = "text_or_number")]
    pub pekerjaan: Option<String>,
    /// Place of birth.
    #[serde(default, deserialize_with = "text_or_number")]
    pub tempat_lahir: Option<String>,
    /// Date of birth.
    #[serde(default, deserialize_with = "text_or_number")]
    pub tgl_lahir: Option<String>,
    /// Gender code.
    #[serde(default, deserialize_with = "text_or_number")]
    pub jenis_kelamin: Option<String>,
    /// Street address.
    #[serde(default, deserialize_with = "text_or_number")]
    pub alamat: Option<String>,
    /// City id.
    #[serde(default, deserialize_with = "text_or_number")]
    pub kota_id: Option<String>,
    /// Tax number.
    #[serde(default, deserialize_with = "text_or_number")]
    pub npwp: Option<String>,
    /// Purchase purpose.
    #[serde(default, deserialize_with = "text_or_number")]
    pub tujuan_beli: Option<String>,
}

// Ids arrive as numbers or strings depending on the endpoint version.
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    })
}

impl CustomerRecord {
    /// Decode the record from the endpoint's JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidRecord`] when the JSON is not an object of
    /// the expected shape.
    pub fn from_json(value: Value) -> ProfileResult<Self> {
        serde_json::from_value(value).map_err(|source| ProfileError::InvalidRecord { source })
    }

    /// First and last name joined by a space; missing parts are skipped.
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.nama_depan, &self.nama_belakang]
            .into_iter()
            .filter_map(|part| part.as_deref().map(str::trim))
            .filter(|part| !part.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }

    /// Baseline slice for the section identified by `form`.
    #[must_use]
    pub fn baseline_for(&self, form: &str) -> Baseline {
        let mut baseline = Baseline::new();
        let entries: Vec<(&str, Option<String>)> = if form == BIODATA.id {
            vec![
                ("name", self.full_name()),
                ("email", self.email.clone()),
                ("phone", self.no_telp_pribadi.clone()),
                ("nik", self.no_ktp.clone()),
                ("job", self.pekerjaan.clone()),
                ("gender", self.jenis_kelamin.clone()),
                ("placeOfBirth", self.tempat_lahir.clone()),
                ("dateOfBirth", self.tgl_lahir.clone()),
            ]
        } else if form == ADDRESS.id {
            vec![
                ("address", self.alamat.clone()),
                ("city", self.kota_id.clone()),
                ("npwp", self.npwp.clone()),
                ("purpose", self.tujuan_beli.clone()),
            ]
        } else {
            Vec::new()
        };
        for (field, value) in entries {
            baseline.insert(field, value);
        }
        baseline
    }
}

/// Fetches the current customer record.
#[async_trait]
pub trait CustomerSource: Send + Sync {
    /// Load the signed-in customer's record.
    async fn fetch_customer(&self) -> Result<CustomerRecord, GatewayError>;
}

/// [`BaselineSource`] serving profile sections from one shared record fetch.
pub struct CustomerBaselines {
    source: Arc<dyn CustomerSource>,
    record: OnceCell<CustomerRecord>,
}

impl CustomerBaselines {
    /// Adapter over `source`.
    #[must_use]
    pub fn new(source: Arc<dyn CustomerSource>) -> Self {
        Self {
            source,
            record: OnceCell::new(),
        }
    }

    /// Record fetched so far, if any.
    #[must_use]
    pub fn record(&self) -> Option<&CustomerRecord> {
        self.record.get()
    }
}

#[async_trait]
impl BaselineSource for CustomerBaselines {
    async fn load_baseline(&self, form: &'static str) -> Result<Baseline, GatewayError> {
        let record = self
            .record
            .get_or_try_init(|| async {
                debug!("fetching customer record");
                self.source.fetch_customer().await
            })
            .await?;
        Ok(record.baseline_for(form))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autosave_core::RawValue;
    use serde_json::json;

    #[test]
    fn numeric_ids_decode_as_text() {
        let record = CustomerRecord::from_json(json!({
            "nama_depan": "Budi",
            "kota_id": 3171,
            "pekerjaan": "2",
            "npwp": null
        }))
        .expect("record decodes");
        assert_eq!(record.kota_id.as_deref(), Some("3171"));
        assert_eq!(record.pekerjaan.as_deref(), Some("2"));
        assert_eq!(record.npwp, None);
    }

    #[test]
    fn malformed_record_is_rejected() {
        let err = CustomerRecord::from_json(json!("Budi Santoso"))
            .expect_err("string is not a record");
        assert!(matches!(err, ProfileError::InvalidRecord { .. }));
    }

    #[test]
    fn full_name_skips_missing_parts() {
        let record = CustomerRecord {
            nama_depan: Some("Budi".into()),
            nama_belakang: Some("Santoso".into()),
            ..CustomerRecord::default()
        };
        assert_eq!(record.full_name().as_deref(), Some("Budi Santoso"));

        let first_only = CustomerRecord {
            nama_depan: Some("Sari".into()),
            ..CustomerRecord::default()
        };
        assert_eq!(first_only.full_name().as_deref(), Some("Sari"));
        assert_eq!(CustomerRecord::default().full_name(), None);
    }

    #[test]
    fn sections_receive_their_own_slice() {
        let record = CustomerRecord {
            nama_depan: Some("Budi".into()),
            alamat: Some("Jl. Merdeka 1".into()),
            kota_id: Some("3171".into()),
            ..CustomerRecord::default()
        };

        let biodata = record.baseline_for(BIODATA.id);
        assert_eq!(biodata.get("name"), Some(&RawValue::from("Budi")));
        assert_eq!(biodata.get("address"), None);
        assert_eq!(biodata.get("email"), Some(&RawValue::Empty));

        let address = record.baseline_for(ADDRESS.id);
        assert_eq!(address.get("city"), Some(&RawValue::from("3171")));
        assert_eq!(address.get("province"), None);
        assert_eq!(record.baseline_for("unknown"), Baseline::new());
    }
}
