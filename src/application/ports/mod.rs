pub mod email;
pub mod payment_gateway;
