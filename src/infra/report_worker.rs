use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::report::ReportUseCases,
};

/// Bounded queue feeding the background report worker. Enqueuing never
/// blocks a request; a full queue is reported back to the caller.
#[derive(Clone)]
pub struct ReportJobQueue {
    sender: mpsc::Sender<Uuid>,
}

impl ReportJobQueue {
    pub fn start(reports: ReportUseCases, capacity: usize) -> Self {
        let (sender, mut receiver) = mpsc::channel(capacity);

        tokio::spawn(async move {
            info!("Report worker started");
            while let Some(questionnaire_id) = receiver.recv().await {
                if let Err(e) = reports.generate(questionnaire_id).await {
                    error!(%questionnaire_id, error = %e, "Report generation failed");
                }
            }
            info!("Report worker stopped");
        });

        Self { sender }
    }

    pub fn enqueue(&self, questionnaire_id: Uuid) -> AppResult<()> {
        self.sender
            .try_send(questionnaire_id)
            .map_err(|e| match e {
                TrySendError::Full(_) => {
                    AppError::Internal("Report queue is full, try again later".into())
                }
                TrySendError::Closed(_) => AppError::Internal("Report worker is not running".into()),
            })
    }
}
