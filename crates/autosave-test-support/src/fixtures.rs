//! Test fixtures and environment helpers.

use std::sync::Once;

use autosave_telemetry::{LogFormat, LoggingConfig, init_logging};
use serde_json::{Value, json};

static TRACING: Once = Once::new();

/// Install a pretty subscriber once per test binary.
///
/// Honors `RUST_LOG`; defaults to `warn` so suites stay quiet.
pub fn init_tracing() {
    TRACING.call_once(|| {
        // Another harness may already own the global subscriber.
        let _ = init_logging(&LoggingConfig {
            level: "warn",
            format: LogFormat::Pretty,
        });
    });
}

/// Customer record as returned by the profile endpoint.
#[must_use]
pub fn customer_json() -> Value {
    json!({
        "nama_depan": "Budi",
        "nama_belakang": "Santoso",
        "email": "budi.santoso@example.co.id",
        "no_telp_pribadi": "081234567890",
        "no_ktp": "3174012501900001",
        "pekerjaan": "2",
        "tempat_lahir": "Jakarta",
        "tgl_lahir": "1990-01-25",
        "jenis_kelamin": "L",
        "alamat": "Jl. Merdeka No. 1",
        "kota_id": "3171",
        "npwp": "12.345.678.9-012.345",
        "tujuan_beli": "1"
    })
}

/// Customer record for a freshly registered user with only a name and email.
#[must_use]
pub fn sparse_customer_json() -> Value {
    json!({
        "nama_depan": "Sari",
        "nama_belakang": null,
        "email": "sari@example.co.id"
    })
}
