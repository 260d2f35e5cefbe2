//! ISP/organization name heuristic for proxy and VPN services.
//!
//! The geolocation service's own proxy flag misses many commercial relays, so the
//! ISP and organization strings are also matched against a fixed keyword list.

/// Case-insensitive substrings that mark an ISP or organization as a proxy, VPN,
/// or relay service. Includes the Chinese terms for proxy (代理), circumvention
/// (翻墙), relay provider (机场), accelerator (加速器) and line (线路).
pub const PROXY_KEYWORDS: &[&str] = &[
    "proxy",
    "vpn",
    "shadowsocks",
    "v2ray",
    "trojan",
    "openvpn",
    "wireguard",
    "代理",
    "翻墙",
    "机场",
    "ss",
    "ssr",
    "加速器",
    "线路",
];

/// Whether `text` contains any proxy keyword, ignoring case.
pub fn contains_proxy_keyword(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    let lower = text.to_lowercase();
    PROXY_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Whether the ISP or the organization name looks like a proxy service.
pub fn looks_like_proxy(isp: &str, org: &str) -> bool {
    contains_proxy_keyword(isp) || contains_proxy_keyword(org)
}
