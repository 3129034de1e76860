use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, instrument};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{ports::email::EmailSender, use_cases::user::UserRepo},
    domain::entities::notification::Notification,
};

#[async_trait]
pub trait NotificationRepo: Send + Sync {
    async fn create(&self, user_id: Uuid, subject: &str, message: &str) -> AppResult<Notification>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Notification>>;
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Notification>>;
    async fn mark_read(&self, id: Uuid) -> AppResult<()>;
}

#[derive(Clone)]
pub struct NotificationUseCases {
    notifications: Arc<dyn NotificationRepo>,
    users: Arc<dyn UserRepo>,
    email: Arc<dyn EmailSender>,
}

impl NotificationUseCases {
    pub fn new(
        notifications: Arc<dyn NotificationRepo>,
        users: Arc<dyn UserRepo>,
        email: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            notifications,
            users,
            email,
        }
    }

    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<Notification>> {
        self.notifications.list_by_user(user_id).await
    }

    pub async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> AppResult<()> {
        let notification = self
            .notifications
            .get_by_id(notification_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if notification.user_id != user_id {
            return Err(AppError::Forbidden);
        }
        self.notifications.mark_read(notification_id).await
    }

    /// Records an in-app notification and emails the user.
    #[instrument(skip(self, message))]
    pub async fn dispatch(&self, user_id: Uuid, subject: &str, message: &str) -> AppResult<()> {
        self.notifications.create(user_id, subject, message).await?;
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let html = format!(
            "<p>Hi {},</p><p>{}</p><p>— The WebWizard Team</p>",
            user.name, message
        );
        self.email.send(&user.email, subject, &html).await
    }

    /// Fire-and-forget variant: a delivery failure never fails the caller's
    /// operation, it only gets logged.
    pub fn dispatch_best_effort(&self, user_id: Uuid, subject: &str, message: &str) {
        let dispatcher = self.clone();
        let subject = subject.to_owned();
        let message = message.to_owned();
        tokio::spawn(async move {
            if let Err(e) = dispatcher.dispatch(user_id, &subject, &message).await {
                error!(%user_id, error = %e, "Failed to dispatch notification");
            }
        });
    }
}
