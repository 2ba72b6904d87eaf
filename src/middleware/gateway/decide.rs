//! Authorization decision: the last gateway stage.
//!
//! Missing sessions go to sign-in. A role lookup failure on an admin route is
//! treated as "not admin" and sends the user to the dashboard.

use tracing::{debug, warn};
use url::form_urlencoded;

use crate::i18n::{Locale, LocaleSettings};
use crate::middleware::gateway::classify::RouteClassification;
use crate::services::auth::{AuthBackend, Principal};

pub const SIGN_IN_PATH: &str = "/learn/auth";
pub const LANDING_PATH: &str = "/learn/dashboard";
pub const REDIRECT_PARAM: &str = "redirect";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Not authenticated; `location` is the localized sign-in page.
    SignIn { location: String },
    /// Authenticated but not authorized; `location` is the localized landing page.
    Landing { location: String },
}

pub async fn decide(
    auth: &dyn AuthBackend,
    locales: &LocaleSettings,
    locale: &Locale,
    route: &RouteClassification,
    principal: Option<&Principal>,
    requested_path: &str,
) -> Decision {
    if !route.is_protected() {
        return Decision::Allow;
    }

    let Some(principal) = principal else {
        return Decision::SignIn {
            location: sign_in_location(locales, locale, requested_path),
        };
    };

    if !route.is_admin() {
        return Decision::Allow;
    }

    match auth.role_of(principal.user_id).await {
        Ok(role) if role.is_admin() => Decision::Allow,
        Ok(role) => {
            debug!(user_id = %principal.user_id, ?role, "admin route denied");
            Decision::Landing {
                location: locales.localize(locale, LANDING_PATH),
            }
        }
        Err(err) => {
            warn!(user_id = %principal.user_id, error = %err, "role lookup failed; denying admin route");
            Decision::Landing {
                location: locales.localize(locale, LANDING_PATH),
            }
        }
    }
}

fn sign_in_location(locales: &LocaleSettings, locale: &Locale, requested_path: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair(REDIRECT_PARAM, requested_path)
        .finish();
    format!("{}?{}", locales.localize(locale, SIGN_IN_PATH), query)
}
