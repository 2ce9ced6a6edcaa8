//! Response classifier
//!
//! Pure mapping from a raw transport outcome to a normalized success or
//! classified error, applied synchronously within completion handling.

use super::options::RequestOptions;
use crate::error::Error;
use crate::transport::{RawResponse, ResponseMeta, TransportFailure, TransportFailureKind};
use bytes::Bytes;
use url::Url;

/// Outcome of classification: the response bytes and metadata on success, or
/// a classified error with whatever metadata was available.
pub(crate) type Classified = Result<(Bytes, ResponseMeta), (Error, Option<ResponseMeta>)>;

/// Classify a raw transport outcome.
///
/// Rules, in order: transport failures pass through (with friendly message
/// remapping unless disabled); a response served from a foreign host is an
/// interstitial redirect; an error status code (>= 400) is an HTTP error
/// unless HTTP errors are disabled; anything else is a success.
pub(crate) fn classify(
    requested_url: &Url,
    outcome: Result<RawResponse, TransportFailure>,
    options: &RequestOptions,
) -> Classified {
    let response = match outcome {
        Ok(response) => response,
        Err(failure) => {
            return Err((
                transport_error(failure, options.friendly_messages_are_disabled()),
                None,
            ))
        }
    };

    if is_interstitial_redirect(requested_url, response.meta.url()) {
        let url = response.meta.url().clone();
        return Err((Error::redirect(url), Some(response.meta)));
    }

    let status = response.meta.status();
    if status.as_u16() >= 400 && !options.http_errors_are_disabled() {
        return Err((Error::http_status(status.as_u16()), Some(response.meta)));
    }

    Ok((response.body, response.meta))
}

/// Whether the final URL indicates the response was served by something
/// other than the requested host, e.g. a captive portal login page.
fn is_interstitial_redirect(requested: &Url, received: &Url) -> bool {
    received.host_str() != requested.host_str()
}

/// Turn a transport failure into an error value, remapping well-known
/// connectivity conditions to clearer wording unless disabled. The failure
/// kind and source are preserved either way.
fn transport_error(failure: TransportFailure, friendly_disabled: bool) -> Error {
    let message = if friendly_disabled {
        failure.message
    } else {
        friendly_message(failure.kind)
            .map(str::to_owned)
            .unwrap_or(failure.message)
    };

    Error::Transport {
        kind: failure.kind,
        message,
        source: failure.source,
    }
}

fn friendly_message(kind: TransportFailureKind) -> Option<&'static str> {
    match kind {
        TransportFailureKind::Offline => Some("You are not connected to the Internet."),
        TransportFailureKind::Timeout => Some("The request timed out."),
        TransportFailureKind::ConnectionFailed => Some("The server could not be reached."),
        TransportFailureKind::Other => None,
    }
}
