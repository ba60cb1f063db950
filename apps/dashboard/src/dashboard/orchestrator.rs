//! Wires user actions to the gateways and turns their outcomes into notices.
//!
//! Every action runs to completion against one `Session`; the caller holds
//! the session lock for the duration.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};

use crate::dashboard::session::{Phase, Session};
use crate::dashboard::views::{
    distinct_missing_skills, match_cards, skill_gap_histogram, MatchCard, Notice, SkillCount,
    MAX_DISPLAYED_MATCHES, NO_MATCHES_MESSAGE, NO_MISSING_SKILLS_MESSAGE,
};
use crate::errors::AppError;
use crate::gateways::courses::{course_query, query_skills, Course};
use crate::gateways::{
    CourseSearch, FeedbackRecorder, InvocationGateway, JobRefreshGateway, MatchStoreReader,
    ObjectStoreGateway,
};
use crate::models::resume::ResumeStatus;
use crate::models::{FeedbackValue, JobMatch};

/// A resume file as received from the client.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl ResumeUpload {
    /// Accepts by declared content type or by `.pdf` extension.
    pub fn is_pdf(&self) -> bool {
        let by_type = self
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.eq_ignore_ascii_case("application/pdf"));
        let by_name = self
            .file_name
            .as_deref()
            .is_some_and(|name| name.to_ascii_lowercase().ends_with(".pdf"));
        by_type || by_name
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CoursesView {
    pub skills: Vec<String>,
    pub query: String,
    pub courses: Vec<Course>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumeStatusView {
    pub status: Option<ResumeStatus>,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub phase: Phase,
    pub user_id: Option<String>,
    pub notices: Vec<Notice>,
    pub matches: Vec<MatchCard>,
    pub total_matches: usize,
    pub skill_gap: Vec<SkillCount>,
}

/// Owns the gateways; constructed once at startup.
#[derive(Clone)]
pub struct Dashboard {
    uploader: ObjectStoreGateway,
    invoker: InvocationGateway,
    refresher: JobRefreshGateway,
    reader: MatchStoreReader,
    recorder: FeedbackRecorder,
    courses: Arc<dyn CourseSearch>,
}

impl Dashboard {
    pub fn new(
        uploader: ObjectStoreGateway,
        invoker: InvocationGateway,
        refresher: JobRefreshGateway,
        reader: MatchStoreReader,
        recorder: FeedbackRecorder,
        courses: Arc<dyn CourseSearch>,
    ) -> Self {
        Self {
            uploader,
            invoker,
            refresher,
            reader,
            recorder,
            courses,
        }
    }

    /// Upload, then fire the processing event. Rejected with a warning and no
    /// state change unless an identity and a PDF are both present.
    pub async fn upload_resume(
        &self,
        session: &Session,
        upload: Option<ResumeUpload>,
    ) -> Vec<Notice> {
        let Some(user) = session.user() else {
            return vec![Notice::warning("Enter email before uploading!")];
        };
        let Some(upload) = upload else {
            return vec![Notice::warning("Select a PDF resume to upload.")];
        };
        if !upload.is_pdf() {
            return vec![Notice::warning("Only PDF resumes are accepted.")];
        }

        let mut notices = Vec::new();
        let key = match self.uploader.upload(upload.bytes, user).await {
            Ok(key) => key,
            Err(e) => {
                warn!("Resume upload for {user} failed: {e}");
                notices.push(Notice::error(format!("Upload failed: {e}")));
                return notices;
            }
        };
        notices.push(Notice::success(format!("Uploaded to S3: {key}")));

        match self.invoker.trigger_processing(&key, user).await {
            Ok(()) => {
                info!("Resume processing triggered for {user} ({key})");
                notices.push(Notice::success(
                    "Resume sent for parsing. Wait 10–15 seconds.",
                ));
            }
            Err(e) => {
                warn!("Resume processing trigger for {user} failed: {e}");
                notices.push(Notice::error(format!("Could not start resume processing: {e}")));
            }
        }
        notices
    }

    pub async fn refresh_jobs(&self, session: &Session) -> Vec<Notice> {
        let Some(user) = session.user() else {
            return vec![Notice::error("Enter your email first!")];
        };

        let outcome = self.refresher.request_refresh(user).await;
        if outcome.accepted {
            vec![Notice::success(
                "Job fetching started. Please wait and click 'Load Matches'.",
            )]
        } else {
            vec![Notice::error(format!("Error: {}", outcome.detail))]
        }
    }

    /// Point-in-time read of the match document. An empty result is a valid
    /// loaded state; a store failure is reported as a notice and leaves the
    /// session untouched.
    pub async fn load_matches(&self, session: &mut Session) -> Vec<Notice> {
        let Some(user) = session.user().cloned() else {
            return vec![Notice::warning("Enter your email first!")];
        };

        let matches = match self.reader.load_matches(&user).await {
            Ok(matches) => matches,
            Err(e) => {
                warn!("Loading matches for {user} failed: {e}");
                return vec![Notice::error(format!("Could not load matches: {e}"))];
            }
        };
        info!("Loaded {} matches for {user}", matches.len());
        // the empty case is reported by `render`
        let notices = if matches.is_empty() {
            Vec::new()
        } else {
            vec![Notice::success(format!("Loaded {} matches.", matches.len()))]
        };
        session.matches_loaded(matches);
        notices
    }

    /// Feedback on the displayed card at `index`. The returned notice reflects
    /// the click, not a read back from the store.
    pub async fn record_feedback(
        &self,
        session: &Session,
        index: usize,
        value: FeedbackValue,
    ) -> Result<Vec<Notice>, AppError> {
        if session.phase() != Phase::MatchesLoaded {
            return Err(AppError::Validation(
                "Load matches before leaving feedback".to_string(),
            ));
        }
        let (Some(user), Some(job)) = (session.user(), displayed(session).get(index)) else {
            return Err(AppError::Validation(format!(
                "No displayed match at index {index}"
            )));
        };

        match self.recorder.record_feedback(user, job, value).await {
            Ok(_) => Ok(vec![match value {
                FeedbackValue::Like => Notice::success("Liked!"),
                FeedbackValue::Dislike => Notice::warning("Disliked!"),
            }]),
            Err(e) => {
                warn!("Feedback for {user} failed: {e}");
                Ok(vec![Notice::error(format!("Could not save feedback: {e}"))])
            }
        }
    }

    /// `status` is `None` until an identity is entered or when the store
    /// could not be read; the latter also carries an error notice.
    pub async fn resume_status(&self, session: &Session) -> ResumeStatusView {
        let Some(user) = session.user() else {
            return ResumeStatusView {
                status: None,
                notices: vec![Notice::warning("Enter your email first!")],
            };
        };

        match self.reader.resume_status(user).await {
            Ok(status) => ResumeStatusView {
                status: Some(status),
                notices: Vec::new(),
            },
            Err(e) => {
                warn!("Resume status for {user} failed: {e}");
                ResumeStatusView {
                    status: None,
                    notices: vec![Notice::error(format!("Could not read resume status: {e}"))],
                }
            }
        }
    }

    /// Course suggestions for the loaded matches. Lookup failures render as
    /// an empty list.
    pub async fn suggest_courses(&self, session: &Session) -> CoursesView {
        let skills = distinct_missing_skills(session.matches());
        let used = query_skills(&skills).to_vec();
        let courses = if used.is_empty() {
            Vec::new()
        } else {
            self.courses.search(&used).await.into_courses()
        };
        CoursesView {
            query: course_query(&used),
            skills: used,
            courses,
        }
    }

    /// Renders the session. Derived views are recomputed on every call.
    pub fn render(&self, session: &Session, mut notices: Vec<Notice>) -> DashboardView {
        let matches = session.matches();
        let skill_gap = skill_gap_histogram(matches);

        match session.phase() {
            Phase::NoEmail => notices.push(Notice::info("Enter your email to get started.")),
            Phase::EmailEntered => {}
            Phase::MatchesLoaded if matches.is_empty() => {
                notices.push(Notice::info(NO_MATCHES_MESSAGE))
            }
            Phase::MatchesLoaded if skill_gap.is_empty() => {
                notices.push(Notice::info(NO_MISSING_SKILLS_MESSAGE))
            }
            Phase::MatchesLoaded => {}
        }

        DashboardView {
            phase: session.phase(),
            user_id: session.user().map(|u| u.to_string()),
            notices,
            matches: match_cards(matches),
            total_matches: matches.len(),
            skill_gap,
        }
    }
}

/// The slice of loaded matches that is shown as cards.
fn displayed(session: &Session) -> &[JobMatch] {
    let matches = session.matches();
    &matches[..matches.len().min(MAX_DISPLAYED_MATCHES)]
}
