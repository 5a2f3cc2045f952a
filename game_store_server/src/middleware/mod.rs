mod acl;
mod jwt;
mod webhook_guard;

pub use acl::{AclMiddlewareFactory, AclMiddlewareService};
pub use jwt::{JwtMiddlewareFactory, JwtMiddlewareService};
pub use webhook_guard::{check_webhook_signature, WebhookGuard, WebhookGuardService, WEBHOOK_SIGNATURE_HEADER};
