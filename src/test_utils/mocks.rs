//! In-memory implementations of the persistence and gateway ports.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::{
            email::EmailSender,
            payment_gateway::{CheckoutSession, CheckoutSpec, GatewayPayment, PaymentGatewayPort},
        },
        use_cases::{
            notification::NotificationRepo,
            payment::{EntitlementGrant, PaymentRepo},
            questionnaire::QuestionnaireRepo,
            subscription::SubscriptionRepo,
            user::UserRepo,
        },
    },
    domain::entities::{
        notification::Notification,
        payment::{Payment, PaymentStatus},
        questionnaire::{Questionnaire, QuestionnaireResponse},
        subscription::Subscription,
        user::{User, UserRole},
    },
};

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Single in-memory store implementing every repo trait, mirroring how
/// `PostgresPersistence` backs them all with one pool.
#[derive(Default)]
pub struct InMemoryPersistence {
    users: Mutex<Vec<User>>,
    payments: Mutex<Vec<Payment>>,
    subscriptions: Mutex<Vec<Subscription>>,
    questionnaires: Mutex<Vec<Questionnaire>>,
    responses: Mutex<Vec<QuestionnaireResponse>>,
    notifications: Mutex<Vec<Notification>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    pub fn insert_subscription(&self, user_id: Uuid, surveys: i32, expires_at: NaiveDateTime) {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        subscriptions.retain(|s| s.user_id != user_id);
        subscriptions.push(Subscription {
            id: Uuid::new_v4(),
            user_id,
            surveys,
            expires_at,
            created_at: now(),
            updated_at: now(),
        });
    }

    /// Seeds a completed payment, as if a checkout had already been
    /// reconciled as paid.
    pub fn insert_paid_payment(
        &self,
        user_id: Uuid,
        amount_cents: i64,
        surveys: i32,
        is_yearly: bool,
    ) -> Payment {
        let payment = Payment {
            id: Uuid::new_v4(),
            user_id,
            amount_cents,
            surveys,
            is_yearly,
            status: "paid".into(),
            mollie_payment_id: Some(format!("tr_seed_{}", Uuid::new_v4().simple())),
            created_at: now(),
            updated_at: now(),
        };
        self.payments.lock().unwrap().push(payment.clone());
        payment
    }

    /// Moves a user's subscription expiry back in time, to make a
    /// recomputed expiry window observable in tests.
    pub fn backdate_subscription(&self, user_id: Uuid, by: TimeDelta) {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        if let Some(subscription) = subscriptions.iter_mut().find(|s| s.user_id == user_id) {
            subscription.expires_at -= by;
        }
    }
}

#[async_trait]
impl UserRepo for InMemoryPersistence {
    async fn create(&self, name: &str, email: &str, password_hash: &str) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(AppError::InvalidInput(
                "A record with this value already exists".into(),
            ));
        }
        let user = User {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role: UserRole::User,
            created_at: now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_profile(&self, id: Uuid, name: &str, email: &str) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AppError::NotFound)?;
        user.name = name.into();
        user.email = email.into();
        Ok(user.clone())
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AppError::NotFound)?;
        user.password_hash = password_hash.into();
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn update_role(&self, id: Uuid, role: UserRole) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AppError::NotFound)?;
        user.role = role;
        Ok(user.clone())
    }
}

#[async_trait]
impl PaymentRepo for InMemoryPersistence {
    async fn create(
        &self,
        user_id: Uuid,
        amount_cents: i64,
        surveys: i32,
        is_yearly: bool,
    ) -> AppResult<Payment> {
        let payment = Payment {
            id: Uuid::new_v4(),
            user_id,
            amount_cents,
            surveys,
            is_yearly,
            status: PaymentStatus::PENDING.into(),
            mollie_payment_id: None,
            created_at: now(),
            updated_at: now(),
        };
        self.payments.lock().unwrap().push(payment.clone());
        Ok(payment)
    }

    async fn set_external_id(&self, payment_id: Uuid, external_id: &str) -> AppResult<()> {
        let mut payments = self.payments.lock().unwrap();
        let payment = payments
            .iter_mut()
            .find(|p| p.id == payment_id)
            .ok_or(AppError::NotFound)?;
        if payment.mollie_payment_id.is_some() {
            return Err(AppError::Internal(format!(
                "Payment {} already has an external id",
                payment_id
            )));
        }
        payment.mollie_payment_id = Some(external_id.into());
        payment.updated_at = now();
        Ok(())
    }

    async fn get_by_external_id(&self, external_id: &str) -> AppResult<Option<Payment>> {
        Ok(self
            .payments
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.mollie_payment_id.as_deref() == Some(external_id))
            .cloned())
    }

    async fn mark_status_and_grant(
        &self,
        payment_id: Uuid,
        status: &str,
        grant: Option<&EntitlementGrant>,
    ) -> AppResult<()> {
        {
            let mut payments = self.payments.lock().unwrap();
            let payment = payments
                .iter_mut()
                .find(|p| p.id == payment_id)
                .ok_or(AppError::NotFound)?;
            payment.status = status.into();
            payment.updated_at = now();
        }
        if let Some(grant) = grant {
            let mut subscriptions = self.subscriptions.lock().unwrap();
            match subscriptions.iter_mut().find(|s| s.user_id == grant.user_id) {
                Some(subscription) => {
                    subscription.surveys = grant.surveys;
                    subscription.expires_at = grant.expires_at;
                    subscription.updated_at = now();
                }
                None => subscriptions.push(Subscription {
                    id: Uuid::new_v4(),
                    user_id: grant.user_id,
                    surveys: grant.surveys,
                    expires_at: grant.expires_at,
                    created_at: now(),
                    updated_at: now(),
                }),
            }
        }
        Ok(())
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .payments
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        payments.reverse();
        Ok(payments)
    }

    async fn latest_paid_by_user(&self, user_id: Uuid) -> AppResult<Option<Payment>> {
        Ok(self
            .payments
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|p| p.user_id == user_id && p.is_paid())
            .cloned())
    }
}

#[async_trait]
impl SubscriptionRepo for InMemoryPersistence {
    async fn get_by_user(&self, user_id: Uuid) -> AppResult<Option<Subscription>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.user_id == user_id)
            .cloned())
    }

    async fn list_expiring_within(&self, cutoff: NaiveDateTime) -> AppResult<Vec<Subscription>> {
        let mut expiring: Vec<Subscription> = self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.expires_at <= cutoff)
            .cloned()
            .collect();
        expiring.sort_by_key(|s| s.expires_at);
        Ok(expiring)
    }
}

#[async_trait]
impl QuestionnaireRepo for InMemoryPersistence {
    async fn create(
        &self,
        user_id: Uuid,
        title: &str,
        description: Option<&str>,
        questions: &serde_json::Value,
        public_slug: &str,
    ) -> AppResult<Questionnaire> {
        let questionnaire = Questionnaire {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            description: description.map(Into::into),
            questions: questions.clone(),
            public_slug: public_slug.into(),
            is_published: false,
            report: None,
            created_at: now(),
            updated_at: now(),
        };
        self.questionnaires.lock().unwrap().push(questionnaire.clone());
        Ok(questionnaire)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Questionnaire>> {
        Ok(self
            .questionnaires
            .lock()
            .unwrap()
            .iter()
            .find(|q| q.id == id)
            .cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> AppResult<Option<Questionnaire>> {
        Ok(self
            .questionnaires
            .lock()
            .unwrap()
            .iter()
            .find(|q| q.public_slug == slug)
            .cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Questionnaire>> {
        let mut questionnaires: Vec<Questionnaire> = self
            .questionnaires
            .lock()
            .unwrap()
            .iter()
            .filter(|q| q.user_id == user_id)
            .cloned()
            .collect();
        questionnaires.reverse();
        Ok(questionnaires)
    }

    async fn count_by_user(&self, user_id: Uuid) -> AppResult<i64> {
        Ok(self
            .questionnaires
            .lock()
            .unwrap()
            .iter()
            .filter(|q| q.user_id == user_id)
            .count() as i64)
    }

    async fn update(
        &self,
        id: Uuid,
        title: &str,
        description: Option<&str>,
        questions: &serde_json::Value,
        is_published: bool,
    ) -> AppResult<Questionnaire> {
        let mut questionnaires = self.questionnaires.lock().unwrap();
        let questionnaire = questionnaires
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or(AppError::NotFound)?;
        questionnaire.title = title.into();
        questionnaire.description = description.map(Into::into);
        questionnaire.questions = questions.clone();
        questionnaire.is_published = is_published;
        questionnaire.updated_at = now();
        Ok(questionnaire.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.questionnaires.lock().unwrap().retain(|q| q.id != id);
        self.responses
            .lock()
            .unwrap()
            .retain(|r| r.questionnaire_id != id);
        Ok(())
    }

    async fn save_report(&self, id: Uuid, report: &serde_json::Value) -> AppResult<()> {
        let mut questionnaires = self.questionnaires.lock().unwrap();
        let questionnaire = questionnaires
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or(AppError::NotFound)?;
        questionnaire.report = Some(report.clone());
        questionnaire.updated_at = now();
        Ok(())
    }

    async fn create_response(
        &self,
        questionnaire_id: Uuid,
        answers: &serde_json::Value,
    ) -> AppResult<QuestionnaireResponse> {
        let response = QuestionnaireResponse {
            id: Uuid::new_v4(),
            questionnaire_id,
            answers: answers.clone(),
            submitted_at: now(),
        };
        self.responses.lock().unwrap().push(response.clone());
        Ok(response)
    }

    async fn list_responses(
        &self,
        questionnaire_id: Uuid,
    ) -> AppResult<Vec<QuestionnaireResponse>> {
        Ok(self
            .responses
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.questionnaire_id == questionnaire_id)
            .cloned()
            .collect())
    }

    async fn recent_responses_for_owner(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<QuestionnaireResponse>> {
        let owned: Vec<Uuid> = self
            .questionnaires
            .lock()
            .unwrap()
            .iter()
            .filter(|q| q.user_id == user_id)
            .map(|q| q.id)
            .collect();
        Ok(self
            .responses
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|r| owned.contains(&r.questionnaire_id))
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NotificationRepo for InMemoryPersistence {
    async fn create(&self, user_id: Uuid, subject: &str, message: &str) -> AppResult<Notification> {
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id,
            subject: subject.into(),
            message: message.into(),
            read: false,
            created_at: now(),
        };
        self.notifications.lock().unwrap().push(notification.clone());
        Ok(notification)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Notification>> {
        Ok(self
            .notifications
            .lock()
            .unwrap()
            .iter()
            .find(|n| n.id == id)
            .cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Notification>> {
        Ok(self
            .notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn mark_read(&self, id: Uuid) -> AppResult<()> {
        let mut notifications = self.notifications.lock().unwrap();
        let notification = notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(AppError::NotFound)?;
        notification.read = true;
        Ok(())
    }
}

/// Gateway mock: payments created through `create_checkout` get sequential
/// `tr_test_N` ids and start as `open`; tests drive the status from there.
#[derive(Default)]
pub struct MockPaymentGateway {
    payments: Mutex<HashMap<String, GatewayPayment>>,
    counter: AtomicU64,
    fail_description_substring: Mutex<Option<String>>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `create_checkout` fail for specs whose description contains the
    /// given substring; used to break one sweep entry while others succeed.
    pub fn fail_when_description_contains(&self, substring: &str) {
        *self.fail_description_substring.lock().unwrap() = Some(substring.into());
    }

    pub fn set_status(&self, external_id: &str, status: &str) {
        if let Some(payment) = self.payments.lock().unwrap().get_mut(external_id) {
            payment.status = status.into();
        }
    }

    pub fn set_webhook_url(&self, external_id: &str, webhook_url: &str) {
        if let Some(payment) = self.payments.lock().unwrap().get_mut(external_id) {
            payment.webhook_url = Some(webhook_url.into());
        }
    }

    /// Registers a payment the gateway knows about but this application
    /// never created.
    pub fn register_foreign_payment(&self, external_id: &str, status: &str, webhook_url: &str) {
        self.payments.lock().unwrap().insert(
            external_id.into(),
            GatewayPayment {
                external_id: external_id.into(),
                status: status.into(),
                webhook_url: Some(webhook_url.into()),
            },
        );
    }
}

#[async_trait]
impl PaymentGatewayPort for MockPaymentGateway {
    async fn create_checkout(&self, spec: &CheckoutSpec) -> AppResult<CheckoutSession> {
        if let Some(substring) = self.fail_description_substring.lock().unwrap().as_deref() {
            if spec.description.contains(substring) {
                return Err(AppError::Gateway("Simulated gateway failure".into()));
            }
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let external_id = format!("tr_test_{}", n);
        self.payments.lock().unwrap().insert(
            external_id.clone(),
            GatewayPayment {
                external_id: external_id.clone(),
                status: "open".into(),
                webhook_url: Some(spec.webhook_url.clone()),
            },
        );
        Ok(CheckoutSession {
            checkout_url: format!("https://checkout.mollie.test/{}", external_id),
            external_id,
        })
    }

    async fn get_payment(&self, external_id: &str) -> AppResult<GatewayPayment> {
        self.payments
            .lock()
            .unwrap()
            .get(external_id)
            .cloned()
            .ok_or_else(|| AppError::Gateway(format!("Unknown payment: {}", external_id)))
    }
}

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Default)]
pub struct InMemoryEmailSender {
    sent: Mutex<Vec<SentEmail>>,
}

impl InMemoryEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for InMemoryEmailSender {
    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        self.sent.lock().unwrap().push(SentEmail {
            to: to.into(),
            subject: subject.into(),
            html: html.into(),
        });
        Ok(())
    }
}
