use std::sync::Arc;
use std::time::Duration;

use autosave_config::AutosaveConfig;
use autosave_core::{
    Baseline, Editability, FieldDescriptor, FieldStatus, FormSession, FormSpec, LoadState,
    NoticeKind, OptionEntry, OptionKind, Pattern, RawValue, Rule, SessionError, SessionEvent,
    SubmitOutcome, Trigger, UploadedFile,
};
use autosave_test_support::fixtures::init_tracing;
use autosave_test_support::mocks::{ScriptedGateway, rejected, unavailable};

const CITY: OptionKind = OptionKind::new("city");

static FIELDS: [FieldDescriptor; 7] = [
    FieldDescriptor::new("email", "email")
        .rules(&[
            Rule::Required("Email harus diisi"),
            Rule::Pattern(Pattern::Email, "Email tidak valid"),
        ])
        .upper(),
    FieldDescriptor::new("phone", "no_telp_pribadi")
        .rules(&[Rule::Required("Nomor HP harus diisi")]),
    FieldDescriptor::new("name", "name")
        .rules(&[Rule::Required("Nama harus diisi")])
        .trigger(Trigger::OnChangeDebounced),
    FieldDescriptor::new("city", "kota")
        .rules(&[Rule::Required("Kota harus dipilih!")])
        .options(CITY)
        .companions(&["province"])
        .autofill("province"),
    FieldDescriptor::new("province", "provinsi").editability(Editability::ReadOnly),
    FieldDescriptor::new("nik", "no_ktp").editability(Editability::LockedWhenPresent),
    FieldDescriptor::new("ktp", "file_ktp")
        .rules(&[
            Rule::Required("KTP harus diunggah"),
            Rule::MaxUpload("Ukuran file tidak boleh lebih dari 2MB"),
        ])
        .trigger(Trigger::OnChange)
        .notices("Foto KTP berhasil diunggah", "Foto KTP gagal diunggah"),
];
static FORM: FormSpec = FormSpec::new("profile", &FIELDS);

fn gateway() -> ScriptedGateway {
    init_tracing();
    ScriptedGateway::new()
        .with_baseline(
            FORM.id,
            Baseline::new()
                .with("email", "budi@example.co.id")
                .with("phone", "081234567890"),
        )
        .with_options(
            CITY,
            vec![
                OptionEntry::new("Jakarta Pusat", "3171").with_parent("31"),
                OptionEntry::new("Bandung", "3273").with_parent("32"),
            ],
        )
}

async fn mount(gateway: ScriptedGateway) -> (Arc<ScriptedGateway>, FormSession) {
    let (gateway, gateways) = gateway.into_gateways();
    let session = FormSession::mount(&FORM, gateways, AutosaveConfig::default()).await;
    (gateway, session)
}

fn notices(session: &FormSession) -> Vec<(NoticeKind, String)> {
    let mut stream = session.subscribe(Some(0));
    let mut found = Vec::new();
    while let Some(envelope) = stream.try_next() {
        if let SessionEvent::Notice { kind, message } = envelope.event {
            found.push((kind, message));
        }
    }
    found
}

#[tokio::test]
async fn dirty_value_is_submitted_once_then_unchanged() {
    let (gateway, session) = mount(gateway()).await;
    assert_eq!(session.load_state(), LoadState::Ready);

    session.set_value("email", "sari@example.com").unwrap();
    assert_eq!(
        session.submit_field("email").await,
        Ok(SubmitOutcome::Submitted)
    );
    assert_eq!(
        session.submit_field("email").await,
        Ok(SubmitOutcome::Unchanged)
    );

    let sent = gateway.submissions_for("email");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].keys(), vec!["email"]);
    assert_eq!(sent[0].text("email"), Some("SARI@EXAMPLE.COM"));

    let state = session.state("email").unwrap();
    assert_eq!(state.committed, RawValue::from("sari@example.com"));
    assert_eq!(state.status, FieldStatus::Idle);
    assert!(state.saved);
    assert!(state.error.is_none());
    // Default success text is not announced globally.
    assert!(notices(&session).is_empty());
}

#[tokio::test]
async fn blur_on_clean_field_sends_nothing() {
    let (gateway, session) = mount(gateway()).await;

    session.blur("email").unwrap();
    session.blur("phone").unwrap();
    session.settle().await;

    assert!(gateway.submissions().is_empty());
    assert_eq!(session.state("email").unwrap().status, FieldStatus::Idle);
}

#[tokio::test]
async fn invalid_value_reports_first_failing_rule() {
    let (gateway, session) = mount(gateway()).await;

    session.set_value("email", "bukan-email").unwrap();
    assert_eq!(session.submit_field("email").await, Ok(SubmitOutcome::Invalid));
    let state = session.state("email").unwrap();
    assert_eq!(state.error.as_deref(), Some("Email tidak valid"));
    assert_eq!(state.status, FieldStatus::Idle);

    session.set_value("email", "").unwrap();
    assert_eq!(session.submit_field("email").await, Ok(SubmitOutcome::Invalid));
    assert_eq!(
        session.state("email").unwrap().error.as_deref(),
        Some("Email harus diisi")
    );
    assert!(gateway.submissions().is_empty());
}

#[tokio::test]
async fn server_rejection_keeps_value_and_retry_succeeds() {
    let (gateway, session) = mount(gateway()).await;
    gateway.fail_next_submit("email", rejected("Email sudah terdaftar"));

    session.set_value("email", "dupe@example.com").unwrap();
    assert_eq!(session.submit_field("email").await, Ok(SubmitOutcome::Failed));
    let failed = session.state("email").unwrap();
    assert_eq!(failed.status, FieldStatus::Failed);
    assert_eq!(failed.error.as_deref(), Some("Email sudah terdaftar"));
    assert_eq!(failed.value, RawValue::from("dupe@example.com"));
    assert_eq!(failed.committed, RawValue::from("budi@example.co.id"));
    assert_eq!(
        notices(&session),
        vec![(NoticeKind::Error, "Terjadi error".to_string())]
    );

    assert_eq!(
        session.submit_field("email").await,
        Ok(SubmitOutcome::Submitted)
    );
    let saved = session.state("email").unwrap();
    assert!(saved.error.is_none());
    assert_eq!(saved.committed, RawValue::from("dupe@example.com"));
    assert_eq!(gateway.submissions_for("email").len(), 2);
}

#[tokio::test]
async fn transport_failure_uses_generic_message() {
    let (gateway, session) = mount(gateway()).await;
    gateway.fail_next_submit("phone", unavailable("submit_single_field"));

    session.set_value("phone", "081298765432").unwrap();
    assert_eq!(session.submit_field("phone").await, Ok(SubmitOutcome::Failed));
    assert_eq!(
        session.state("phone").unwrap().error.as_deref(),
        Some("Terjadi error")
    );
}

#[tokio::test]
async fn edits_during_flight_wait_and_latest_value_wins() {
    let (gateway, session) = mount(gateway()).await;
    gateway.hold_submissions();

    session.set_value("email", "first@example.com").unwrap();
    session.blur("email").unwrap();
    gateway.wait_for_submissions(1).await;
    assert!(session.is_submitting("email"));

    session.set_value("email", "second@example.com").unwrap();
    session.blur("email").unwrap();
    session.set_value("email", "third@example.com").unwrap();
    session.blur("email").unwrap();
    tokio::task::yield_now().await;

    gateway.release_submissions();
    session.settle().await;

    let sent = gateway.submissions_for("email");
    assert_eq!(gateway.peak_in_flight("email"), 1);
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].text("email"), Some("FIRST@EXAMPLE.COM"));
    assert_eq!(sent[1].text("email"), Some("THIRD@EXAMPLE.COM"));
    assert_eq!(
        session.state("email").unwrap().committed,
        RawValue::from("third@example.com")
    );
}

#[tokio::test]
async fn queued_requests_coalesce_behind_one_waiter() {
    let (gateway, session) = mount(gateway()).await;
    gateway.hold_submissions();
    session.set_value("phone", "081211112222").unwrap();
    session.blur("phone").unwrap();
    gateway.wait_for_submissions(1).await;

    session.set_value("phone", "081233334444").unwrap();
    let (waiter, extra) = tokio::join!(session.submit_field("phone"), async {
        tokio::task::yield_now().await;
        let extra = session.submit_field("phone").await;
        gateway.release_submissions();
        extra
    });

    assert_eq!(extra, Ok(SubmitOutcome::Coalesced));
    assert_eq!(waiter, Ok(SubmitOutcome::Submitted));
    session.settle().await;
    assert_eq!(gateway.submissions_for("phone").len(), 2);
}

#[tokio::test]
async fn abandoned_wait_does_not_swallow_later_edits() {
    let (gateway, session) = mount(gateway()).await;
    gateway.hold_submissions();
    session.set_value("phone", "081211112222").unwrap();
    session.blur("phone").unwrap();
    gateway.wait_for_submissions(1).await;

    session.set_value("phone", "081233334444").unwrap();
    let abandoned =
        tokio::time::timeout(Duration::from_millis(20), session.submit_field("phone")).await;
    assert!(abandoned.is_err());

    gateway.release_submissions();
    session.settle().await;
    assert_eq!(gateway.submissions_for("phone").len(), 2);
    assert_eq!(
        session.state("phone").unwrap().committed,
        RawValue::from("081233334444")
    );

    gateway.hold_submissions();
    session.set_value("phone", "081244445555").unwrap();
    session.blur("phone").unwrap();
    gateway.wait_for_submissions(3).await;

    session.set_value("phone", "081255556666").unwrap();
    let (later, ()) = tokio::join!(session.submit_field("phone"), async {
        tokio::task::yield_now().await;
        gateway.release_submissions();
    });
    assert_eq!(later, Ok(SubmitOutcome::Submitted));

    session.settle().await;
    let sent = gateway.submissions_for("phone");
    assert_eq!(sent.len(), 4);
    assert_eq!(sent[3].text("no_telp_pribadi"), Some("081255556666"));
    assert_eq!(
        session.state("phone").unwrap().committed,
        RawValue::from("081255556666")
    );
}

#[tokio::test]
async fn dropped_submit_future_still_resolves_field_state() {
    let (gateway, session) = mount(gateway()).await;
    gateway.hold_submissions();
    session.set_value("phone", "081298765432").unwrap();

    let abandoned =
        tokio::time::timeout(Duration::from_millis(20), session.submit_field("phone")).await;
    assert!(abandoned.is_err());
    assert!(session.is_submitting("phone"));

    gateway.release_submissions();
    session.settle().await;

    let state = session.state("phone").unwrap();
    assert_eq!(state.status, FieldStatus::Idle);
    assert!(!state.is_loading());
    assert!(state.saved);
    assert_eq!(state.committed, RawValue::from("081298765432"));
    assert!(!session.is_submitting("phone"));
}

#[tokio::test]
async fn different_fields_submit_independently() {
    let (gateway, session) = mount(gateway()).await;
    gateway.hold_submissions();

    session.set_value("email", "sari@example.com").unwrap();
    session.set_value("phone", "081298765432").unwrap();
    session.blur("email").unwrap();
    session.blur("phone").unwrap();

    gateway.wait_for_submissions(2).await;
    assert!(session.is_submitting("email"));
    assert!(session.is_submitting("phone"));

    gateway.release_submissions();
    session.settle().await;
    assert_eq!(gateway.submissions().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn debounced_field_submits_once_typing_pauses() {
    let (gateway, session) = mount(gateway()).await;

    for text in ["B", "Bu", "Bud"] {
        session.change("name", text).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    session.change("name", "Budi").unwrap();
    tokio::time::sleep(Duration::from_millis(299)).await;
    assert!(gateway.submissions().is_empty());

    tokio::time::sleep(Duration::from_millis(2)).await;
    session.settle().await;
    let sent = gateway.submissions_for("name");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text("name"), Some("Budi"));
}

#[tokio::test(start_paused = true)]
async fn blur_flushes_pending_debounce() {
    let (gateway, session) = mount(gateway()).await;

    session.change("name", "Budi").unwrap();
    session.blur("name").unwrap();
    session.settle().await;
    assert_eq!(gateway.submissions_for("name").len(), 1);

    tokio::time::sleep(Duration::from_secs(1)).await;
    session.settle().await;
    assert_eq!(gateway.submissions_for("name").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn saved_flag_clears_after_display_window() {
    let (_gateway, session) = mount(gateway()).await;

    session.set_value("phone", "081298765432").unwrap();
    session.submit_field("phone").await.unwrap();
    assert!(session.state("phone").unwrap().saved);

    tokio::time::sleep(Duration::from_millis(1_999)).await;
    assert!(session.state("phone").unwrap().saved);
    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(!session.state("phone").unwrap().saved);
}

#[tokio::test]
async fn close_discards_in_flight_result() {
    let (gateway, session) = mount(gateway()).await;
    gateway.hold_submissions();

    session.set_value("email", "late@example.com").unwrap();
    session.blur("email").unwrap();
    gateway.wait_for_submissions(1).await;

    session.close();
    gateway.release_submissions();
    session.settle().await;

    let state = session.state("email").unwrap();
    assert_eq!(state.committed, RawValue::from("budi@example.co.id"));
    assert_eq!(state.status, FieldStatus::Submitting);
    assert!(matches!(
        session.set_value("email", "again@example.com"),
        Err(SessionError::Closed { form: "profile" })
    ));
}

#[tokio::test(start_paused = true)]
async fn close_cancels_pending_debounce() {
    let (gateway, session) = mount(gateway()).await;

    session.change("name", "Budi").unwrap();
    session.close();
    tokio::time::sleep(Duration::from_secs(1)).await;
    session.settle().await;

    assert!(gateway.submissions().is_empty());
}

#[tokio::test]
async fn baseline_failure_blocks_until_reload() {
    let gateway = gateway();
    gateway.fail_next_baseline(FORM.id, unavailable("load_baseline"));
    let (gateway, session) = mount(gateway).await;

    assert!(matches!(session.load_state(), LoadState::Failed { .. }));
    session.set_value("phone", "081298765432").unwrap();
    assert_eq!(session.submit_field("phone").await, Ok(SubmitOutcome::Blocked));
    assert!(gateway.submissions().is_empty());

    session.reload_baseline().await.unwrap();
    assert_eq!(session.load_state(), LoadState::Ready);
    let phone = session.state("phone").unwrap();
    assert_eq!(phone.value, RawValue::from("081298765432"));
    assert_eq!(phone.committed, RawValue::from("081234567890"));
    assert_eq!(
        session.state("email").unwrap().value,
        RawValue::from("budi@example.co.id")
    );

    assert_eq!(
        session.submit_field("phone").await,
        Ok(SubmitOutcome::Submitted)
    );
    session.reload_baseline().await.unwrap();
    assert_eq!(gateway.baseline_fetches(FORM.id), 2);
}

#[tokio::test]
async fn option_failure_blocks_only_dependent_field() {
    let gateway = gateway();
    gateway.fail_next_options(CITY, unavailable("fetch_option_list"));
    let (gateway, session) = mount(gateway).await;

    assert!(session.options(CITY).is_none());
    session.set_value("city", "3171").unwrap();
    assert_eq!(session.submit_field("city").await, Ok(SubmitOutcome::Blocked));

    session.set_value("phone", "081298765432").unwrap();
    assert_eq!(
        session.submit_field("phone").await,
        Ok(SubmitOutcome::Submitted)
    );

    let cities = session.load_options(CITY).await.unwrap();
    assert_eq!(cities.len(), 2);
    assert_eq!(
        session.submit_field("city").await,
        Ok(SubmitOutcome::Submitted)
    );
    assert_eq!(gateway.option_fetches(CITY), 2);
}

#[tokio::test]
async fn city_selection_fills_province_and_sends_it_along() {
    let (gateway, session) = mount(gateway()).await;

    session.set_value("city", "3273").unwrap();
    assert_eq!(
        session.state("province").unwrap().value,
        RawValue::from("32")
    );
    assert!(matches!(
        session.set_value("province", "31"),
        Err(SessionError::ReadOnlyField {
            field: "province",
            ..
        })
    ));

    assert_eq!(
        session.submit_field("city").await,
        Ok(SubmitOutcome::Submitted)
    );
    let sent = gateway.submissions_for("city");
    assert_eq!(sent[0].keys(), vec!["kota", "provinsi"]);
    assert_eq!(sent[0].text("provinsi"), Some("32"));
    assert_eq!(
        session.state("province").unwrap().committed,
        RawValue::from("32")
    );
    assert_eq!(
        session.submit_field("province").await,
        Ok(SubmitOutcome::Unchanged)
    );
    assert_eq!(gateway.option_fetches(CITY), 1);
}

#[tokio::test]
async fn baseline_value_locks_field() {
    let locked = ScriptedGateway::new().with_baseline(
        FORM.id,
        Baseline::new().with("nik", "3174012501900001"),
    );
    let (_gateway, session) = mount(locked).await;
    assert!(session.state("nik").unwrap().locked);
    assert!(matches!(
        session.set_value("nik", "1111111111111111"),
        Err(SessionError::ReadOnlyField { field: "nik", .. })
    ));

    let (_gateway, open) = mount(gateway()).await;
    assert!(open.set_value("nik", "3174012501900001").is_ok());
}

#[tokio::test]
async fn file_upload_submits_on_change_with_custom_notices() {
    let (gateway, session) = mount(gateway()).await;

    let photo = RawValue::file(UploadedFile::new("ktp.jpg", "image/jpeg", vec![0; 1024]));
    session.change("ktp", photo).unwrap();
    session.settle().await;

    let sent = gateway.submissions_for("ktp");
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].file("file_ktp").map(|file| file.file().name.as_str()),
        Some("ktp.jpg")
    );
    assert_eq!(
        notices(&session),
        vec![(
            NoticeKind::Success,
            "Foto KTP berhasil diunggah".to_string()
        )]
    );

    let oversized = RawValue::file(UploadedFile::new(
        "scan.png",
        "image/png",
        vec![0; 3 * 1024 * 1024],
    ));
    session.change("ktp", oversized).unwrap();
    session.settle().await;
    assert_eq!(gateway.submissions_for("ktp").len(), 1);
    assert_eq!(
        session.state("ktp").unwrap().error.as_deref(),
        Some("Ukuran file tidak boleh lebih dari 2MB")
    );
}

#[tokio::test]
async fn unknown_fields_are_rejected() {
    let (_gateway, session) = mount(gateway()).await;
    assert!(matches!(
        session.set_value("fax", "123"),
        Err(SessionError::UnknownField { .. })
    ));
    assert!(session.submit_field("fax").await.is_err());
    assert_eq!(session.snapshot().len(), FIELDS.len());
}
