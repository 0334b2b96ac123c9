//! Route authorization against an explicit [`SessionContext`].

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::session::{RoutingRole, SessionContext};

pub const LOGIN_PATH: &str = "/login";

/// Paths reachable without a session.
const PUBLIC_PATHS: &[&str] = &["/", LOGIN_PATH];

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "location", rename_all = "snake_case")]
pub enum RouteDecision {
  Allow,
  RedirectToLogin,
  /// Signed in, but the path belongs to another role.
  Redirect(&'static str),
}

/// The role whose area `path` falls under, if any.
fn owning_role(path: &str) -> Option<RoutingRole> {
  RoutingRole::ALL
    .into_iter()
    .filter(|role| *role != RoutingRole::Guest)
    .find(|role| {
      let prefix = role.landing_path();
      path == prefix
        || path
          .strip_prefix(prefix)
          .is_some_and(|rest| rest.starts_with('/'))
    })
}

/// Decide whether the holder of `ctx` may open `path`.
///
/// A context that has expired at `now` counts as no session at all. A signed
/// in user navigating into another role's area is sent to their own landing
/// page.
pub fn authorize_route(
  ctx: Option<&SessionContext>,
  path: &str,
  now: DateTime<Utc>,
) -> RouteDecision {
  let path = match path.trim_end_matches('/') {
    "" => "/",
    p => p,
  };
  if PUBLIC_PATHS.contains(&path) {
    return RouteDecision::Allow;
  }

  let ctx = ctx.filter(|c| !c.is_expired_at(now));
  match (ctx, owning_role(path)) {
    (None, _) => RouteDecision::RedirectToLogin,
    (Some(c), Some(owner)) if c.routing_role != owner => {
      RouteDecision::Redirect(c.routing_role.landing_path())
    }
    (Some(_), _) => RouteDecision::Allow,
  }
}
