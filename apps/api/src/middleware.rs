use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use ipnet::IpNet;
use smartsales_core::{ActorContext, AppError};

use crate::error::ApiResult;
use crate::state::AppState;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Resolves the bearer token into an [`ActorContext`] request extension.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;
    let account = state.user_service.authenticate_token(token).await?;

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| address.ip());
    let client_ip = client_ip(peer, request.headers(), &state.trusted_proxies);

    let actor = ActorContext::new(account.id, account.username, account.role, client_ip);
    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

/// Extracts the token from `Authorization: Bearer <token>` or `Token <token>`.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") && !scheme.eq_ignore_ascii_case("token") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// First `X-Forwarded-For` hop when the peer is a trusted proxy, else the peer.
fn client_ip(peer: Option<IpAddr>, headers: &HeaderMap, trusted: &[IpNet]) -> Option<String> {
    let peer_is_trusted =
        peer.is_some_and(|address| trusted.iter().any(|network| network.contains(&address)));

    if peer_is_trusted {
        let forwarded = headers
            .get(FORWARDED_FOR)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .and_then(|hop| hop.parse::<IpAddr>().ok());
        if let Some(address) = forwarded {
            return Some(address.to_string());
        }
    }

    peer.map(|address| address.to_string())
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use axum::http::{HeaderMap, HeaderValue};
    use ipnet::IpNet;

    use super::{bearer_token, client_ip};

    fn headers(name: &'static str, value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_static(value));
        headers
    }

    fn proxy_networks() -> Vec<IpNet> {
        let Ok(network) = "10.0.0.0/8".parse::<IpNet>() else {
            panic!("valid network");
        };
        vec![network]
    }

    #[test]
    fn forwarded_header_is_used_only_behind_trusted_proxies() {
        let forwarded = headers("x-forwarded-for", "203.0.113.7, 10.0.0.2");
        let proxy = Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)));
        let stranger = Some(IpAddr::V4(Ipv4Addr::new(198, 51, 100, 1)));

        assert_eq!(
            client_ip(proxy, &forwarded, &proxy_networks()).as_deref(),
            Some("203.0.113.7")
        );
        assert_eq!(
            client_ip(stranger, &forwarded, &proxy_networks()).as_deref(),
            Some("198.51.100.1")
        );
        assert_eq!(client_ip(None, &forwarded, &proxy_networks()), None);
    }

    #[test]
    fn malformed_forwarded_hop_falls_back_to_peer() {
        let forwarded = headers("x-forwarded-for", "unknown");
        let proxy = Some(IpAddr::V4(Ipv4Addr::new(10, 1, 1, 1)));

        assert_eq!(
            client_ip(proxy, &forwarded, &proxy_networks()).as_deref(),
            Some("10.1.1.1")
        );
    }

    #[test]
    fn bearer_and_token_schemes_are_accepted() {
        let bearer = headers("authorization", "Bearer abc123");
        let token = headers("authorization", "token  xyz ");
        let basic = headers("authorization", "Basic dXNlcg==");

        assert_eq!(bearer_token(&bearer), Some("abc123"));
        assert_eq!(bearer_token(&token), Some("xyz"));
        assert_eq!(bearer_token(&basic), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
