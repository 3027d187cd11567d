//! OpenAPI document for the gateway.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::handlers;

/// OpenAPI description of every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "drip-gateway",
        description = "Paid-content marketplace: purchase verification, access grants and creator payouts."
    ),
    paths(
        handlers::purchase::submit_purchase,
        handlers::purchase::list_purchases,
        handlers::purchase::get_library,
        handlers::access::check_access,
        handlers::content::list_content,
        handlers::content::publish_content,
        handlers::creator::sign_in,
        handlers::creator::get_profile,
        handlers::payout::list_pending,
        handlers::payout::process_payout,
        handlers::system::health_handler,
    ),
    modifiers(&BearerSchemes),
    tags(
        (name = "Purchases", description = "Payment claims and wallet libraries"),
        (name = "Access", description = "Access token redemption"),
        (name = "Content", description = "Catalog browsing and publishing"),
        (name = "Creators", description = "Creator sign-in and dashboard"),
        (name = "Payouts", description = "Admin creator payouts"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Registers the admin and creator bearer schemes.
#[derive(Debug)]
struct BearerSchemes;

impl Modify for BearerSchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "admin_token",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
        components.add_security_scheme(
            "creator_token",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
