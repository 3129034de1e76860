pub mod notification;
pub mod payment;
pub mod questionnaire;
pub mod subscription;
pub mod user;
