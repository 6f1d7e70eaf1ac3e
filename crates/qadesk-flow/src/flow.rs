// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Submission flow state machine.
//!
//! Steps: SelectProject -> SelectAction -> GatheringData -> Processing -> Result.
//! No step is terminal; a failed validation or generation leaves the flow in
//! a state the tester can continue from.

use std::sync::Arc;

use qadesk_core::{
    Action, Catalog, ChatMessage, FlowStep, LocalDraft, MessageKind, Project, QadeskError,
    ReportGenerator, ReportRequest,
};
use qadesk_storage::DraftStore;
use strum::{Display, EnumString};
use tracing::{debug, info, warn};

use crate::connectivity::ConnectivityMonitor;
use crate::form::{Field, FormState};

/// Text stored when generation fails for any reason.
pub const FAILURE_MESSAGE: &str = "Lo siento, ocurrió un error crítico al procesar tu solicitud.";

/// Entries of the action menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MenuChoice {
    #[strum(serialize = "report", serialize = "reportar", serialize = "bug")]
    Report,
    Retest,
    #[strum(serialize = "exit", serialize = "salir")]
    Exit,
}

/// First half of a submission.
#[derive(Debug)]
pub enum Submission {
    /// Validation failed; the flow stays in GatheringData.
    Invalid(Vec<Field>),
    /// Offline: the form was stored as a draft and the session reset.
    SavedOffline(LocalDraft),
    /// Online: the flow is Processing and this request must be settled.
    Pending(ReportRequest),
}

/// How a submission ended.
#[derive(Debug)]
pub enum SubmitOutcome {
    Invalid(Vec<Field>),
    SavedOffline(LocalDraft),
    Generated(ChatMessage),
    /// The generator failed; `message` holds the generic failure text.
    Failed {
        message: ChatMessage,
        error: QadeskError,
    },
}

/// Transient state of one tester session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub step: FlowStep,
    pub project: Option<Project>,
    /// Present from GatheringData through Result.
    pub form: Option<FormState>,
}

impl SessionContext {
    fn new() -> Self {
        Self {
            step: FlowStep::SelectProject,
            project: None,
            form: None,
        }
    }
}

/// Drives one tester session.
pub struct FlowController {
    session: SessionContext,
    catalog: Arc<Catalog>,
    drafts: DraftStore,
    generator: Arc<dyn ReportGenerator>,
    connectivity: ConnectivityMonitor,
}

impl FlowController {
    pub fn new(
        catalog: Arc<Catalog>,
        drafts: DraftStore,
        generator: Arc<dyn ReportGenerator>,
        connectivity: ConnectivityMonitor,
    ) -> Self {
        Self {
            session: SessionContext::new(),
            catalog,
            drafts,
            generator,
            connectivity,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn step(&self) -> FlowStep {
        self.session.step
    }

    pub fn project(&self) -> Option<Project> {
        self.session.project
    }

    pub fn action(&self) -> Option<Action> {
        self.session.form.as_ref().map(FormState::action)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The form, present from GatheringData through Result.
    pub fn form(&self) -> Option<&FormState> {
        self.session.form.as_ref()
    }

    /// Mutable form access, only while gathering data.
    pub fn form_mut(&mut self) -> Result<&mut FormState, QadeskError> {
        self.expect_step(&[FlowStep::GatheringData], "edit the form")?;
        self.session
            .form
            .as_mut()
            .ok_or_else(|| QadeskError::Internal("gathering data without a form".into()))
    }

    pub fn drafts(&self) -> &DraftStore {
        &self.drafts
    }

    pub fn drafts_mut(&mut self) -> &mut DraftStore {
        &mut self.drafts
    }

    pub fn history(&self) -> &[ChatMessage] {
        self.drafts.history()
    }

    pub fn connectivity(&self) -> &ConnectivityMonitor {
        &self.connectivity
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    pub fn select_project(&mut self, project: Project) -> Result<(), QadeskError> {
        self.expect_step(&[FlowStep::SelectProject], "select a project")?;
        self.session.project = Some(project);
        self.transition(FlowStep::SelectAction);
        Ok(())
    }

    /// Opens an empty form of the chosen shape.
    pub fn select_action(&mut self, action: Action) -> Result<(), QadeskError> {
        self.expect_step(
            &[FlowStep::SelectAction, FlowStep::Result],
            "select an action",
        )?;
        let project = self.require_project()?;
        self.session.form = Some(FormState::new(self.catalog.clone(), project, action));
        self.transition(FlowStep::GatheringData);
        Ok(())
    }

    /// Applies an action-menu entry.
    pub async fn choose(&mut self, choice: MenuChoice) -> Result<(), QadeskError> {
        match choice {
            MenuChoice::Report => self.select_action(Action::Report),
            MenuChoice::Retest => self.select_action(Action::Retest),
            MenuChoice::Exit => self.exit().await,
        }
    }

    /// Ends the session: project, form and message history are cleared.
    pub async fn exit(&mut self) -> Result<(), QadeskError> {
        if self.session.step == FlowStep::Processing {
            return Err(self.invalid("exit"));
        }
        self.drafts.clear_history().await?;
        self.reset_session();
        info!("session reset");
        Ok(())
    }

    /// Leaves the form and returns to the action menu.
    pub fn cancel(&mut self) -> Result<(), QadeskError> {
        self.expect_step(&[FlowStep::GatheringData], "cancel")?;
        self.session.form = None;
        self.transition(FlowStep::SelectAction);
        Ok(())
    }

    /// Validates the form and routes it by connectivity.
    ///
    /// On [`Submission::Pending`] the flow is Processing and must be
    /// finished with [`settle`](Self::settle).
    pub async fn begin_submission(&mut self) -> Result<Submission, QadeskError> {
        self.expect_step(&[FlowStep::GatheringData], "submit")?;
        let project = self.require_project()?;
        let form = self
            .session
            .form
            .as_mut()
            .ok_or_else(|| QadeskError::Internal("gathering data without a form".into()))?;

        if !form.validate() {
            let missing = form.missing_fields();
            debug!(missing = missing.len(), "submission rejected by validation");
            return Ok(Submission::Invalid(missing));
        }

        let action = form.action();
        let report = form.snapshot();

        if !self.connectivity.is_online() {
            let draft = self.drafts.save(project, action, report).await?;
            self.reset_session();
            info!(id = %draft.id, "offline, submission kept as draft");
            return Ok(Submission::SavedOffline(draft));
        }

        self.transition(FlowStep::Processing);
        Ok(Submission::Pending(ReportRequest { project, report }))
    }

    /// Records the generator outcome and moves to Result.
    ///
    /// Exactly one assistant message is appended either way. The form is
    /// emptied only on success so a failed submission can be revised.
    pub async fn settle(
        &mut self,
        result: Result<String, QadeskError>,
    ) -> Result<SubmitOutcome, QadeskError> {
        self.expect_step(&[FlowStep::Processing], "settle a submission")?;
        let project = self.require_project()?;
        let action = self
            .action()
            .ok_or_else(|| QadeskError::Internal("processing without a form".into()))?;

        self.transition(FlowStep::Result);

        match result {
            Ok(text) => {
                let message =
                    ChatMessage::assistant(text).with_metadata(MessageKind::from(action), project);
                if let Some(form) = self.session.form.as_mut() {
                    form.reset();
                }
                self.drafts.append_message(message.clone()).await?;
                info!(generator = %self.generator.name(), "report generated");
                Ok(SubmitOutcome::Generated(message))
            }
            Err(error) => {
                warn!(error = %error, "report generation failed");
                let message = ChatMessage::assistant(FAILURE_MESSAGE);
                self.drafts.append_message(message.clone()).await?;
                Ok(SubmitOutcome::Failed { message, error })
            }
        }
    }

    /// Full submission: validate, route, and await the generator if online.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, QadeskError> {
        match self.begin_submission().await? {
            Submission::Invalid(missing) => Ok(SubmitOutcome::Invalid(missing)),
            Submission::SavedOffline(draft) => Ok(SubmitOutcome::SavedOffline(draft)),
            Submission::Pending(request) => {
                let result = self.generator.generate(&request).await;
                self.settle(result).await
            }
        }
    }

    /// Goes back to the last submitted form from the Result step.
    pub fn revise(&mut self) -> Result<(), QadeskError> {
        self.expect_step(&[FlowStep::Result], "revise")?;
        let project = self.require_project()?;
        let form = self.session.form.get_or_insert_with(|| {
            FormState::new(self.catalog.clone(), project, Action::Report)
        });
        form.clear_error();
        self.transition(FlowStep::GatheringData);
        Ok(())
    }

    /// Takes a stored draft out of the store and opens it for editing.
    pub async fn resume_draft(&mut self, id: &str) -> Result<(), QadeskError> {
        self.expect_step(
            &[
                FlowStep::SelectProject,
                FlowStep::SelectAction,
                FlowStep::Result,
            ],
            "resume a draft",
        )?;
        let draft = self
            .drafts
            .load(id)
            .await?
            .ok_or_else(|| QadeskError::DraftNotFound(id.to_string()))?;

        let mut form = FormState::new(self.catalog.clone(), draft.project, draft.action);
        form.load(draft.data);
        self.session.project = Some(draft.project);
        self.session.form = Some(form);
        self.transition(FlowStep::GatheringData);
        info!(id, project = %draft.project, "draft resumed");
        Ok(())
    }

    fn reset_session(&mut self) {
        debug!(from = %self.session.step, "session context reset");
        self.session = SessionContext::new();
    }

    fn transition(&mut self, to: FlowStep) {
        debug!(from = %self.session.step, to = %to, "flow transition");
        self.session.step = to;
    }

    fn expect_step(&self, allowed: &[FlowStep], operation: &'static str) -> Result<(), QadeskError> {
        if allowed.contains(&self.session.step) {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: &'static str) -> QadeskError {
        QadeskError::InvalidTransition {
            from: self.session.step,
            operation,
        }
    }

    fn require_project(&self) -> Result<Project, QadeskError> {
        self.session.project.ok_or_else(|| {
            QadeskError::Internal(format!("no project during the {} step", self.session.step))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use qadesk_core::{RecordStore, Role};
    use qadesk_storage::MemoryRecordStore;

    struct Scripted {
        replies: Mutex<VecDeque<Result<String, QadeskError>>>,
        seen: Mutex<Vec<ReportRequest>>,
    }

    #[async_trait]
    impl ReportGenerator for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, request: &ReportRequest) -> Result<String, QadeskError> {
            self.seen.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(QadeskError::EmptyResponse))
        }
    }

    async fn controller(
        replies: Vec<Result<String, QadeskError>>,
    ) -> (FlowController, Arc<Scripted>) {
        let generator = Arc::new(Scripted {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        });
        let drafts = DraftStore::open(Arc::new(MemoryRecordStore::new()))
            .await
            .unwrap();
        let flow = FlowController::new(
            Arc::new(Catalog::builtin()),
            drafts,
            generator.clone(),
            ConnectivityMonitor::new(true),
        );
        (flow, generator)
    }

    fn fill_bug(form: &mut FormState) {
        form.set_field("version", "3.1.0").unwrap();
        form.select_browser("Google Chrome").unwrap();
        form.select_environment("Portal de Comercio - GETNET EVO").unwrap();
        form.set_field("description", "El listado no pagina").unwrap();
        form.set_field("expectedResult", "Muestra la página 2").unwrap();
        form.set_field("obtainedResult", "Repite la página 1").unwrap();
        form.set_field("evidence", "video.mp4").unwrap();
    }

    async fn gathering_bug(flow: &mut FlowController) {
        flow.select_project(Project::Getnet).unwrap();
        flow.select_action(Action::Report).unwrap();
        fill_bug(flow.form_mut().unwrap());
    }

    #[tokio::test]
    async fn starts_at_project_selection() {
        let (flow, _) = controller(vec![]).await;
        assert_eq!(flow.step(), FlowStep::SelectProject);
        assert!(flow.form().is_none());
    }

    #[tokio::test]
    async fn invalid_transitions_leave_state_unchanged() {
        let (mut flow, _) = controller(vec![]).await;
        let err = flow.select_action(Action::Report).unwrap_err();
        assert!(matches!(
            err,
            QadeskError::InvalidTransition { from: FlowStep::SelectProject, .. }
        ));
        assert!(flow.cancel().is_err());
        assert!(flow.submit().await.is_err());
        assert!(flow.revise().is_err());
        assert_eq!(flow.step(), FlowStep::SelectProject);

        flow.select_project(Project::Bpagos).unwrap();
        assert!(flow.select_project(Project::Getnet).is_err());
        assert_eq!(flow.project(), Some(Project::Bpagos));
    }

    #[tokio::test]
    async fn validation_failure_sets_error_without_side_effects() {
        let (mut flow, generator) = controller(vec![]).await;
        flow.select_project(Project::Getnet).unwrap();
        flow.select_action(Action::Report).unwrap();

        let outcome = flow.submit().await.unwrap();
        let SubmitOutcome::Invalid(missing) = outcome else {
            panic!("expected validation failure, got {outcome:?}");
        };
        assert_eq!(missing.len(), 8);
        assert_eq!(flow.step(), FlowStep::GatheringData);
        assert!(flow.form().unwrap().has_error());
        assert!(flow.history().is_empty());
        assert!(flow.drafts().list().is_empty());
        assert!(generator.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn online_success_appends_one_tagged_message() {
        let (mut flow, generator) = controller(vec![Ok("Versión: 3.1.0".into())]).await;
        gathering_bug(&mut flow).await;

        let outcome = flow.submit().await.unwrap();
        let SubmitOutcome::Generated(message) = outcome else {
            panic!("expected generated report, got {outcome:?}");
        };
        assert_eq!(flow.step(), FlowStep::Result);
        assert_eq!(flow.history(), &[message.clone()]);
        assert_eq!(message.role, Role::Assistant);
        let metadata = message.metadata.unwrap();
        assert_eq!(metadata.kind, Some(MessageKind::Bug));
        assert_eq!(metadata.project, Some(Project::Getnet));

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].project, Project::Getnet);
    }

    #[tokio::test]
    async fn processing_is_observable_and_exclusive() {
        let (mut flow, _) = controller(vec![]).await;
        gathering_bug(&mut flow).await;

        let submission = flow.begin_submission().await.unwrap();
        assert!(matches!(submission, Submission::Pending(_)));
        assert_eq!(flow.step(), FlowStep::Processing);
        assert!(flow.begin_submission().await.is_err());
        assert!(flow.exit().await.is_err());
        assert!(flow.form_mut().is_err());

        flow.settle(Ok("Versión: 1".into())).await.unwrap();
        assert_eq!(flow.step(), FlowStep::Result);
        assert!(flow.settle(Ok("again".into())).await.is_err());
    }

    #[tokio::test]
    async fn failure_keeps_form_for_revision() {
        let (mut flow, _) = controller(vec![Err(QadeskError::Generator {
            message: "HTTP 500".into(),
            source: None,
        })])
        .await;
        gathering_bug(&mut flow).await;
        let submitted = flow.form().unwrap().snapshot();

        let outcome = flow.submit().await.unwrap();
        let SubmitOutcome::Failed { message, .. } = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert_eq!(message.content, FAILURE_MESSAGE);
        assert_eq!(flow.history().len(), 1);
        assert_eq!(flow.step(), FlowStep::Result);

        flow.revise().unwrap();
        assert_eq!(flow.step(), FlowStep::GatheringData);
        assert_eq!(flow.form().unwrap().snapshot(), submitted);
    }

    #[tokio::test]
    async fn offline_submit_saves_draft_and_keeps_history() {
        let (mut flow, generator) = controller(vec![Ok("Versión: 1".into())]).await;
        gathering_bug(&mut flow).await;
        flow.submit().await.unwrap();
        flow.select_action(Action::Report).unwrap();
        fill_bug(flow.form_mut().unwrap());
        let snapshot = flow.form().unwrap().snapshot();

        flow.connectivity().set_online(false);
        let outcome = flow.submit().await.unwrap();
        let SubmitOutcome::SavedOffline(draft) = outcome else {
            panic!("expected offline draft, got {outcome:?}");
        };
        assert_eq!(draft.data, snapshot);
        assert_eq!(draft.project, Project::Getnet);
        assert_eq!(flow.drafts().list(), &[draft]);
        assert_eq!(flow.history().len(), 1);
        assert_eq!(flow.step(), FlowStep::SelectProject);
        assert!(flow.project().is_none());
        assert!(flow.form().is_none());
        assert_eq!(generator.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn resumed_draft_is_consumed_and_restored() {
        let (mut flow, _) = controller(vec![]).await;
        gathering_bug(&mut flow).await;
        let snapshot = flow.form().unwrap().snapshot();
        flow.connectivity().set_online(false);
        let SubmitOutcome::SavedOffline(draft) = flow.submit().await.unwrap() else {
            panic!("expected offline draft");
        };

        flow.resume_draft(&draft.id).await.unwrap();
        assert_eq!(flow.step(), FlowStep::GatheringData);
        assert_eq!(flow.project(), Some(Project::Getnet));
        assert_eq!(flow.action(), Some(Action::Report));
        assert_eq!(flow.form().unwrap().snapshot(), snapshot);
        assert!(flow.drafts().list().is_empty());

        flow.cancel().unwrap();
        let err = flow.resume_draft(&draft.id).await.unwrap_err();
        assert!(matches!(err, QadeskError::DraftNotFound(_)));
    }

    #[tokio::test]
    async fn exit_clears_session_and_history() {
        let (mut flow, _) = controller(vec![Ok("Versión: 1".into())]).await;
        gathering_bug(&mut flow).await;
        flow.submit().await.unwrap();
        assert_eq!(flow.history().len(), 1);

        flow.choose("salir".parse().unwrap()).await.unwrap();
        assert_eq!(flow.step(), FlowStep::SelectProject);
        assert!(flow.history().is_empty());
        assert!(flow.project().is_none());
    }

    /// A record store whose deletes always fail.
    struct NoRemove(MemoryRecordStore);

    #[async_trait]
    impl RecordStore for NoRemove {
        async fn read(&self, key: &str) -> Result<Option<String>, QadeskError> {
            self.0.read(key).await
        }

        async fn write(&self, key: &str, value: String) -> Result<(), QadeskError> {
            self.0.write(key, value).await
        }

        async fn remove(&self, _key: &str) -> Result<(), QadeskError> {
            Err(QadeskError::Internal("read-only medium".into()))
        }
    }

    #[tokio::test]
    async fn failed_exit_keeps_session_and_history() {
        let generator = Arc::new(Scripted {
            replies: Mutex::new(vec![Ok("Versión: 3.1.0".to_string())].into()),
            seen: Mutex::new(Vec::new()),
        });
        let drafts = DraftStore::open(Arc::new(NoRemove(MemoryRecordStore::new())))
            .await
            .unwrap();
        let mut flow = FlowController::new(
            Arc::new(Catalog::builtin()),
            drafts,
            generator,
            ConnectivityMonitor::new(true),
        );
        flow.select_project(Project::Getnet).unwrap();
        flow.select_action(Action::Report).unwrap();
        fill_bug(flow.form_mut().unwrap());
        flow.submit().await.unwrap();

        assert!(flow.exit().await.is_err());
        assert_eq!(flow.step(), FlowStep::Result);
        assert_eq!(flow.project(), Some(Project::Getnet));
        assert_eq!(flow.history().len(), 1);
    }

    #[tokio::test]
    async fn cancel_returns_to_action_menu() {
        let (mut flow, _) = controller(vec![]).await;
        flow.select_project(Project::Bpagos).unwrap();
        flow.choose(MenuChoice::Retest).await.unwrap();
        flow.submit().await.unwrap();
        assert!(flow.form().unwrap().has_error());

        flow.cancel().unwrap();
        assert_eq!(flow.step(), FlowStep::SelectAction);
        flow.select_action(Action::Retest).unwrap();
        assert!(!flow.form().unwrap().has_error());
    }

    #[test]
    fn menu_choices_parse() {
        assert_eq!("Report".parse::<MenuChoice>().unwrap(), MenuChoice::Report);
        assert_eq!("retest".parse::<MenuChoice>().unwrap(), MenuChoice::Retest);
        assert_eq!("EXIT".parse::<MenuChoice>().unwrap(), MenuChoice::Exit);
    }
}
