//! 客户端地址提取
//!
//! 事件记录的地址来自转发头（X-Forwarded-For 第一项，其次 X-Real-IP），
//! 只接受能解析为 IP 的值，其余记为 `"unknown"`。
//! 限流键则只在连接来自可信代理（或未配置时来自私有地址）时才读取转发头。

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use tracing::debug;

/// 无法确定客户端地址时记录的占位值
pub const UNKNOWN_IP: &str = "unknown";

/// 检查 IP 是否为私有地址或 localhost
pub fn is_private_or_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback() || v4.is_link_local(),
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || (v6.segments()[0] & 0xfe00) == 0xfc00 // fc00::/7
                || (v6.segments()[0] & 0xffc0) == 0xfe80 // fe80::/10
        }
    }
}

/// 解析 `ip` 或 `ip:port`（含 `[v6]:port`）
pub fn parse_ip(raw: &str) -> Option<IpAddr> {
    let raw = raw.trim();
    raw.parse::<IpAddr>()
        .ok()
        .or_else(|| raw.parse::<SocketAddr>().ok().map(|addr| addr.ip()))
}

/// CIDR 匹配，如 `10.0.0.0/8`、`fd00::/8`
pub fn ip_in_cidr(ip: &IpAddr, cidr: &str) -> bool {
    let Some((network, prefix_len)) = cidr.split_once('/') else {
        return false;
    };
    let Ok(network) = network.parse::<IpAddr>() else {
        return false;
    };
    let Ok(prefix_len) = prefix_len.parse::<u32>() else {
        return false;
    };

    match (ip, network) {
        (IpAddr::V4(ip), IpAddr::V4(net)) if prefix_len <= 32 => {
            let mask = u32::MAX.checked_shl(32 - prefix_len).unwrap_or(0);
            (u32::from(*ip) & mask) == (u32::from(net) & mask)
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) if prefix_len <= 128 => {
            let mask = u128::MAX.checked_shl(128 - prefix_len).unwrap_or(0);
            (u128::from(*ip) & mask) == (u128::from(net) & mask)
        }
        _ => false,
    }
}

/// 地址是否属于可信代理（单个 IP 或 CIDR）
pub fn is_trusted_proxy(ip: &IpAddr, trusted_proxies: &[String]) -> bool {
    trusted_proxies.iter().map(|p| p.trim()).any(|proxy| {
        if proxy.contains('/') {
            ip_in_cidr(ip, proxy)
        } else {
            parse_ip(proxy).is_some_and(|p| p == *ip)
        }
    })
}

/// 从 HeaderMap 提取转发的 IP；不是合法地址的值被忽略
pub fn forwarded_ip_from_headers(headers: &HeaderMap) -> Option<IpAddr> {
    let header_ip = |name: &str, first_hop: bool| {
        let value = headers.get(name)?.to_str().ok()?;
        let value = if first_hop {
            value.split(',').next()?
        } else {
            value
        };
        parse_ip(value)
    };

    header_ip("x-forwarded-for", true).or_else(|| header_ip("x-real-ip", false))
}

/// 上报事件记录的客户端地址，缺失或无法解析时为 `"unknown"`
pub fn client_ip(req: &HttpRequest) -> String {
    forwarded_ip_from_headers(req.headers())
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN_IP.to_string())
}

/// 限流键
///
/// 1. 配置了 `trusted_proxies`：连接来自其中之一才读取转发头
/// 2. 未配置：连接来自私有地址/localhost 时视为反向代理
/// 3. 其余情况使用连接地址，转发头不可信
pub fn rate_limit_key(req: &HttpRequest, trusted_proxies: &[String]) -> Option<String> {
    let peer = req.connection_info().peer_addr().and_then(parse_ip)?;

    let behind_proxy = if trusted_proxies.is_empty() {
        is_private_or_local(&peer)
    } else {
        is_trusted_proxy(&peer, trusted_proxies)
    };

    if behind_proxy && let Some(forwarded) = forwarded_ip_from_headers(req.headers()) {
        debug!("Rate limit key via proxy {}: {}", peer, forwarded);
        return Some(forwarded.to_string());
    }
    Some(peer.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn peer(addr: &str) -> TestRequest {
        TestRequest::default().peer_addr(addr.parse().unwrap())
    }

    #[test]
    fn test_forwarded_for_first_entry_wins() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "198.51.100.4, 10.0.0.1"))
            .insert_header(("X-Real-IP", "203.0.113.9"))
            .to_http_request();
        assert_eq!(client_ip(&req), "198.51.100.4");
    }

    #[test]
    fn test_forwarded_with_port() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "198.51.100.4:51234"))
            .to_http_request();
        assert_eq!(client_ip(&req), "198.51.100.4");

        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "[2001:db8::7]:443"))
            .to_http_request();
        assert_eq!(client_ip(&req), "2001:db8::7");
    }

    #[test]
    fn test_real_ip_fallback() {
        let req = TestRequest::default()
            .insert_header(("X-Real-IP", "203.0.113.9"))
            .to_http_request();
        assert_eq!(client_ip(&req), "203.0.113.9");
    }

    #[test]
    fn test_garbage_forwarded_value_is_not_stored() {
        let long = format!("{}, 10.0.0.1", "x".repeat(120));
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", long.as_str()))
            .to_http_request();
        assert_eq!(client_ip(&req), UNKNOWN_IP);

        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "not-an-ip"))
            .insert_header(("X-Real-IP", "203.0.113.9"))
            .to_http_request();
        assert_eq!(client_ip(&req), "203.0.113.9");
    }

    #[test]
    fn test_missing_headers_yield_sentinel() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(client_ip(&req), UNKNOWN_IP);

        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", " "))
            .to_http_request();
        assert_eq!(client_ip(&req), UNKNOWN_IP);
    }

    #[test]
    fn test_is_private_or_local() {
        assert!(is_private_or_local(&"10.0.0.1".parse().unwrap()));
        assert!(is_private_or_local(&"192.168.1.1".parse().unwrap()));
        assert!(is_private_or_local(&"::1".parse().unwrap()));
        assert!(is_private_or_local(&"fd00::1".parse().unwrap()));
        assert!(!is_private_or_local(&"8.8.8.8".parse().unwrap()));
        assert!(!is_private_or_local(
            &"2001:4860:4860::8888".parse().unwrap()
        ));
    }

    #[test]
    fn test_ip_in_cidr() {
        let ip: IpAddr = "192.168.1.77".parse().unwrap();
        assert!(ip_in_cidr(&ip, "192.168.1.0/24"));
        assert!(!ip_in_cidr(&ip, "192.168.2.0/24"));
        assert!(ip_in_cidr(&ip, "0.0.0.0/0"));
        assert!(!ip_in_cidr(&ip, "192.168.1.0/33"));
        assert!(!ip_in_cidr(&ip, "fd00::/8"));
        assert!(ip_in_cidr(&"fd00::1".parse().unwrap(), "fd00::/8"));
    }

    #[test]
    fn test_public_peer_ignores_forwarded_for() {
        let req = peer("203.0.113.9:4000")
            .insert_header(("X-Forwarded-For", "10.9.9.1"))
            .to_http_request();
        assert_eq!(rate_limit_key(&req, &[]).as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn test_private_peer_is_treated_as_proxy() {
        let req = peer("10.0.0.2:4000")
            .insert_header(("X-Forwarded-For", "198.51.100.4"))
            .to_http_request();
        assert_eq!(rate_limit_key(&req, &[]).as_deref(), Some("198.51.100.4"));
    }

    #[test]
    fn test_explicit_trusted_proxies() {
        let trusted = vec!["203.0.113.0/24".to_string()];
        let req = peer("203.0.113.9:4000")
            .insert_header(("X-Forwarded-For", "198.51.100.4"))
            .to_http_request();
        assert_eq!(
            rate_limit_key(&req, &trusted).as_deref(),
            Some("198.51.100.4")
        );

        // 配置后私有地址不再自动信任
        let req = peer("10.0.0.2:4000")
            .insert_header(("X-Forwarded-For", "198.51.100.4"))
            .to_http_request();
        assert_eq!(rate_limit_key(&req, &trusted).as_deref(), Some("10.0.0.2"));
    }
}
