//! CORS policy values and per-request decision logic.
//!
//! A [`CorsPolicy`] is an immutable, validated rendering of one named
//! configuration profile. Header values are parsed and joined once at
//! construction so that per-request evaluation is pure, infallible lookup.
//!
//! Rejection is silent by design: a disallowed origin gets a response with
//! no access-control headers, indistinguishable from a server with no CORS
//! support at all, so probes cannot enumerate the configured origins.

use std::collections::BTreeSet;

use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, header};

use super::PolicyStore;
use crate::config::{CORS_WILDCARD, ConfigError, CorsProfileConfig};

/// One named, immutable CORS policy.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    name: String,
    allowed_origins: BTreeSet<String>,
    /// True when `allowed_origins` contains the `*` sentinel. Mutually
    /// exclusive with `allow_credentials`.
    any_origin: bool,
    allow_credentials: bool,
    allowed_headers: AllowedHeaders,
    /// Pre-joined `Access-Control-Allow-Methods` value.
    methods_value: HeaderValue,
    /// Pre-joined `Access-Control-Expose-Headers` value, if any are exposed.
    exposed_value: Option<HeaderValue>,
    max_age_value: HeaderValue,
}

/// Allowed request headers: the wildcard sentinel or a fixed set.
#[derive(Debug, Clone)]
enum AllowedHeaders {
    /// Echo whatever headers the preflight asks for.
    Any,
    /// Pre-joined fixed header list.
    List(HeaderValue),
}

impl CorsPolicy {
    /// Build a policy from one configuration profile, validating every
    /// construction invariant.
    pub fn from_profile(name: &str, profile: &CorsProfileConfig) -> Result<Self, ConfigError> {
        let allowed_origins: BTreeSet<String> = profile.allowed_origins.iter().cloned().collect();
        let any_origin = allowed_origins.contains(CORS_WILDCARD);

        // Wildcard origin with credentials would let any site send
        // credentialed requests; browsers forbid the combination and so
        // does this store.
        if any_origin && profile.allow_credentials {
            return Err(ConfigError::Validation(format!(
                "cors profile {name:?} allows credentials together with a wildcard origin"
            )));
        }

        for method in &profile.allowed_methods {
            method.parse::<Method>().map_err(|_| {
                ConfigError::Validation(format!(
                    "cors profile {name:?} has an invalid method {method:?}"
                ))
            })?;
        }
        let methods_value = join_header_value(&profile.allowed_methods).map_err(|_| {
            ConfigError::Validation(format!("cors profile {name:?} has an unencodable method list"))
        })?;

        let allowed_headers = if profile
            .allowed_headers
            .iter()
            .any(|h| h == CORS_WILDCARD)
        {
            AllowedHeaders::Any
        } else {
            parse_header_names(name, &profile.allowed_headers)?;
            AllowedHeaders::List(join_header_value(&profile.allowed_headers).map_err(|_| {
                ConfigError::Validation(format!(
                    "cors profile {name:?} has an unencodable header list"
                ))
            })?)
        };

        let exposed_value = if profile.exposed_headers.is_empty() {
            None
        } else {
            parse_header_names(name, &profile.exposed_headers)?;
            Some(join_header_value(&profile.exposed_headers).map_err(|_| {
                ConfigError::Validation(format!(
                    "cors profile {name:?} has an unencodable exposed-header list"
                ))
            })?)
        };

        Ok(Self {
            name: name.to_string(),
            allowed_origins,
            any_origin,
            allow_credentials: profile.allow_credentials,
            allowed_headers,
            methods_value,
            exposed_value,
            max_age_value: HeaderValue::from(profile.max_age_secs),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn allows_origin(&self, origin: &str) -> bool {
        self.any_origin || self.allowed_origins.contains(origin)
    }

    /// Headers for a successful preflight answer.
    fn preflight_headers(
        &self,
        origin: &HeaderValue,
        requested_headers: Option<&HeaderValue>,
    ) -> HeaderMap {
        let mut out = HeaderMap::new();
        self.put_allow_origin(&mut out, origin);
        out.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            self.methods_value.clone(),
        );
        match &self.allowed_headers {
            // Wildcard policies echo the requested headers back; the echoed
            // value is exactly what the browser asked for, never a literal
            // `*` (which would be ignored for credentialed requests).
            AllowedHeaders::Any => {
                if let Some(requested) = requested_headers {
                    out.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
                }
            }
            AllowedHeaders::List(value) => {
                out.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, value.clone());
            }
        }
        if self.allow_credentials {
            out.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }
        out.insert(header::ACCESS_CONTROL_MAX_AGE, self.max_age_value.clone());
        out
    }

    /// Headers attached to the response of an allowed actual request.
    fn actual_headers(&self, origin: &HeaderValue) -> HeaderMap {
        let mut out = HeaderMap::new();
        self.put_allow_origin(&mut out, origin);
        if let Some(exposed) = &self.exposed_value {
            out.insert(header::ACCESS_CONTROL_EXPOSE_HEADERS, exposed.clone());
        }
        if self.allow_credentials {
            out.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }
        out
    }

    fn put_allow_origin(&self, out: &mut HeaderMap, origin: &HeaderValue) {
        if self.any_origin {
            // Construction guarantees credentials are off for wildcard
            // policies, so the literal `*` is safe here.
            out.insert(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            );
        } else {
            out.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            // The allow-origin value depends on the request origin, so
            // caches must key on it.
            out.append(header::VARY, HeaderValue::from_static("Origin"));
        }
    }
}

/// The per-request CORS decision.
#[derive(Debug)]
pub enum CorsDecision {
    /// No `Origin` header: same-origin or non-browser client. No CORS
    /// headers are added and the pipeline proceeds normally.
    PassThrough,

    /// Preflight from an allowed origin. Answer immediately with these
    /// headers; authentication and the role check never run.
    Preflight(HeaderMap),

    /// Preflight from a disallowed origin. Answer immediately with no
    /// access-control headers.
    PreflightRejected,

    /// Actual request from an allowed origin. Continue the pipeline and
    /// attach these headers to the response.
    Actual(HeaderMap),

    /// Actual request from a disallowed origin. Continue the pipeline with
    /// no access-control headers; the browser withholds the response from
    /// the calling script.
    Rejected,
}

/// Resolve the applicable policy for `path` and decide how to treat the
/// request. Exactly one policy applies, chosen by longest-prefix match;
/// policies are never merged.
pub fn evaluate(
    store: &PolicyStore,
    method: &Method,
    path: &str,
    headers: &HeaderMap,
) -> CorsDecision {
    let Some(origin) = headers.get(header::ORIGIN) else {
        return CorsDecision::PassThrough;
    };

    let policy = store.resolve_cors(path);
    let is_preflight = *method == Method::OPTIONS
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);

    // An origin that is not valid UTF-8 cannot match any configured origin.
    let allowed = origin
        .to_str()
        .is_ok_and(|origin| policy.allows_origin(origin));

    if !allowed {
        tracing::debug!(path, policy = policy.name(), "cross-origin request rejected");
        return if is_preflight {
            CorsDecision::PreflightRejected
        } else {
            CorsDecision::Rejected
        };
    }

    if is_preflight {
        let requested = headers.get(header::ACCESS_CONTROL_REQUEST_HEADERS);
        CorsDecision::Preflight(policy.preflight_headers(origin, requested))
    } else {
        CorsDecision::Actual(policy.actual_headers(origin))
    }
}

fn parse_header_names(profile: &str, names: &[String]) -> Result<(), ConfigError> {
    for name in names {
        name.parse::<HeaderName>().map_err(|_| {
            ConfigError::Validation(format!(
                "cors profile {profile:?} has an invalid header name {name:?}"
            ))
        })?;
    }
    Ok(())
}

fn join_header_value(parts: &[String]) -> Result<HeaderValue, http::header::InvalidHeaderValue> {
    HeaderValue::from_str(&parts.join(", "))
}
