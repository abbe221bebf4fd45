//! Scripted collaborators for exercising form sessions without a server.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use autosave_core::{
    Baseline, BaselineSource, FieldSubmitter, GatewayError, Gateways, OptionEntry, OptionKind,
    OptionSource, SubmissionPayload,
};
use tokio::sync::watch;

#[derive(Default)]
struct Script {
    baselines: HashMap<&'static str, Baseline>,
    options: HashMap<OptionKind, Vec<OptionEntry>>,
    baseline_failures: HashMap<&'static str, VecDeque<GatewayError>>,
    option_failures: HashMap<OptionKind, VecDeque<GatewayError>>,
    submit_failures: HashMap<&'static str, VecDeque<GatewayError>>,
    submissions: Vec<SubmissionPayload>,
    baseline_fetches: HashMap<&'static str, usize>,
    option_fetches: HashMap<OptionKind, usize>,
    in_flight: HashMap<&'static str, usize>,
    peak: HashMap<&'static str, usize>,
}

/// In-memory gateway playing all three collaborator roles.
///
/// Submissions are recorded when they start. Failures are queued per field,
/// form or list and consumed in order. While held, submissions park inside the
/// collaborator until [`ScriptedGateway::release_submissions`].
pub struct ScriptedGateway {
    script: Mutex<Script>,
    open: watch::Sender<bool>,
    started: watch::Sender<usize>,
}

impl Default for ScriptedGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedGateway {
    /// Gateway that accepts everything and serves empty data.
    #[must_use]
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script::default()),
            open: watch::Sender::new(true),
            started: watch::Sender::new(0),
        }
    }

    /// Serve `baseline` for `form`.
    #[must_use]
    pub fn with_baseline(self, form: &'static str, baseline: Baseline) -> Self {
        self.script().baselines.insert(form, baseline);
        self
    }

    /// Serve `entries` for `kind`.
    #[must_use]
    pub fn with_options(self, kind: OptionKind, entries: Vec<OptionEntry>) -> Self {
        self.script().options.insert(kind, entries);
        self
    }

    /// Wrap in an `Arc` and hand out every collaborator role.
    #[must_use]
    pub fn into_gateways(self) -> (Arc<Self>, Gateways) {
        let gateway = Arc::new(self);
        let gateways = Gateways::shared(Arc::clone(&gateway));
        (gateway, gateways)
    }

    /// Fail the next submission of `field`.
    pub fn fail_next_submit(&self, field: &'static str, error: GatewayError) {
        self.script()
            .submit_failures
            .entry(field)
            .or_default()
            .push_back(error);
    }

    /// Fail the next baseline load of `form`.
    pub fn fail_next_baseline(&self, form: &'static str, error: GatewayError) {
        self.script()
            .baseline_failures
            .entry(form)
            .or_default()
            .push_back(error);
    }

    /// Fail the next fetch of `kind`.
    pub fn fail_next_options(&self, kind: OptionKind, error: GatewayError) {
        self.script()
            .option_failures
            .entry(kind)
            .or_default()
            .push_back(error);
    }

    /// Park every submission until released.
    pub fn hold_submissions(&self) {
        self.open.send_replace(false);
    }

    /// Let parked and future submissions complete.
    pub fn release_submissions(&self) {
        self.open.send_replace(true);
    }

    /// Wait until at least `count` submissions have started.
    pub async fn wait_for_submissions(&self, count: usize) {
        let mut started = self.started.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = started.wait_for(|seen| *seen >= count).await;
    }

    /// Every payload received, in arrival order.
    #[must_use]
    pub fn submissions(&self) -> Vec<SubmissionPayload> {
        self.script().submissions.clone()
    }

    /// Payloads received for `field`.
    #[must_use]
    pub fn submissions_for(&self, field: &str) -> Vec<SubmissionPayload> {
        self.script()
            .submissions
            .iter()
            .filter(|payload| payload.field == field)
            .cloned()
            .collect()
    }

    /// Highest number of simultaneous submissions observed for `field`.
    #[must_use]
    pub fn peak_in_flight(&self, field: &str) -> usize {
        self.script().peak.get(field).copied().unwrap_or_default()
    }

    /// Baseline requests made for `form`.
    #[must_use]
    pub fn baseline_fetches(&self, form: &str) -> usize {
        self.script()
            .baseline_fetches
            .get(form)
            .copied()
            .unwrap_or_default()
    }

    /// Fetches made for `kind`.
    #[must_use]
    pub fn option_fetches(&self, kind: OptionKind) -> usize {
        self.script()
            .option_fetches
            .get(&kind)
            .copied()
            .unwrap_or_default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl FieldSubmitter for ScriptedGateway {
    async fn submit_single_field(&self, payload: SubmissionPayload) -> Result<(), GatewayError> {
        let field = payload.field;
        let failure = {
            let mut script = self.script();
            script.submissions.push(payload);
            let in_flight = script.in_flight.entry(field).or_default();
            *in_flight += 1;
            let current = *in_flight;
            let peak = script.peak.entry(field).or_default();
            *peak = (*peak).max(current);
            script
                .submit_failures
                .get_mut(field)
                .and_then(VecDeque::pop_front)
        };
        self.started.send_modify(|count| *count += 1);

        let mut open = self.open.subscribe();
        let _ = open.wait_for(|open| *open).await;

        if let Some(in_flight) = self.script().in_flight.get_mut(field) {
            *in_flight -= 1;
        }
        failure.map_or(Ok(()), Err)
    }
}

#[async_trait]
impl BaselineSource for ScriptedGateway {
    async fn load_baseline(&self, form: &'static str) -> Result<Baseline, GatewayError> {
        let mut script = self.script();
        *script.baseline_fetches.entry(form).or_default() += 1;
        if let Some(error) = script
            .baseline_failures
            .get_mut(form)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }
        Ok(script.baselines.get(form).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl OptionSource for ScriptedGateway {
    async fn fetch_option_list(&self, kind: OptionKind) -> Result<Vec<OptionEntry>, GatewayError> {
        let mut script = self.script();
        *script.option_fetches.entry(kind).or_default() += 1;
        if let Some(error) = script
            .option_failures
            .get_mut(&kind)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }
        Ok(script.options.get(&kind).cloned().unwrap_or_default())
    }
}

/// Transport-style failure for scripting.
#[must_use]
pub fn unavailable(operation: &'static str) -> GatewayError {
    GatewayError::Unavailable {
        operation,
        detail: "scripted failure".to_string(),
    }
}

/// Server rejection carrying `message`.
#[must_use]
pub fn rejected(message: &str) -> GatewayError {
    GatewayError::Rejected {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autosave_core::{PayloadPart, PayloadValue};

    fn payload(field: &'static str, text: &str) -> SubmissionPayload {
        SubmissionPayload {
            form: "biodata",
            field,
            parts: vec![PayloadPart {
                key: field,
                value: PayloadValue::Text(text.to_string()),
            }],
        }
    }

    #[tokio::test]
    async fn scripted_failures_are_consumed_in_order() {
        let gateway = ScriptedGateway::new();
        gateway.fail_next_submit("email", rejected("Email sudah terdaftar"));

        let first = gateway.submit_single_field(payload("email", "a@b.co")).await;
        let second = gateway.submit_single_field(payload("email", "a@b.co")).await;

        assert_eq!(first, Err(rejected("Email sudah terdaftar")));
        assert_eq!(second, Ok(()));
        assert_eq!(gateway.submissions_for("email").len(), 2);
        assert_eq!(gateway.peak_in_flight("email"), 1);
    }

    #[tokio::test]
    async fn option_and_baseline_fetches_are_counted() {
        let kind = OptionKind::new("job");
        let gateway = ScriptedGateway::new()
            .with_options(kind, vec![OptionEntry::new("Karyawan", "1")]);
        gateway.fail_next_options(kind, unavailable("fetch_option_list"));

        assert!(gateway.fetch_option_list(kind).await.is_err());
        assert_eq!(gateway.fetch_option_list(kind).await.map(|list| list.len()), Ok(1));
        assert_eq!(gateway.option_fetches(kind), 2);

        assert_eq!(gateway.load_baseline("biodata").await, Ok(Baseline::new()));
        assert_eq!(gateway.baseline_fetches("biodata"), 1);
    }
}
