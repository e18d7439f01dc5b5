// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::net::IpAddr;
use thiserror::Error;
use tokio::net::lookup_host;
use url::{Host, Url};

use crate::config::settings::SecuritySettings;

/// 地址检查错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Missing host")]
    MissingHost,

    /// 主机指向私有、环回或链路本地地址
    #[error("{0} is not allowed")]
    Blocked(String),

    /// 主机名无法解析，与目标不可达同等对待
    #[error("failed to resolve {host}: {reason}")]
    Unresolvable { host: String, reason: String },
}

impl AddressError {
    /// 判断错误是否为策略拒绝（而不是网络故障）
    pub fn is_blocked(&self) -> bool {
        matches!(self, AddressError::MissingHost | AddressError::Blocked(_))
    }
}

/// 出站地址守卫
///
/// 页面地址、每个图片地址以及重定向的每一跳在发起网络请求前都经过这里
#[derive(Debug, Clone, Default)]
pub struct AddressGuard {
    block_private_networks: bool,
    allowed_hosts: Vec<String>,
}

impl AddressGuard {
    pub fn new(settings: &SecuritySettings) -> Self {
        Self {
            block_private_networks: settings.block_private_networks,
            allowed_hosts: settings.allowed_hosts.clone(),
        }
    }

    pub async fn check(&self, url: &Url) -> Result<(), AddressError> {
        if !self.block_private_networks {
            return Ok(());
        }
        let trusted = url.host_str().is_some_and(|host| {
            self.allowed_hosts
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(host))
        });
        if trusted {
            return Ok(());
        }
        validate_public_url(url).await
    }
}

/// 验证 URL 是否安全 (防止 SSRF)
///
/// 检查主机解析后的 IP 是否为私有地址或环回地址。
pub async fn validate_public_url(url: &Url) -> Result<(), AddressError> {
    let host = url.host().ok_or(AddressError::MissingHost)?;

    let domain = match host {
        Host::Ipv4(ip) => return check_ip(IpAddr::V4(ip)),
        Host::Ipv6(ip) => return check_ip(IpAddr::V6(ip)),
        Host::Domain(domain) => domain,
    };

    if domain.eq_ignore_ascii_case("localhost") {
        return Err(AddressError::Blocked("localhost".to_string()));
    }

    let port = url.port_or_known_default().unwrap_or(80);
    let addrs = lookup_host((domain, port))
        .await
        .map_err(|e| AddressError::Unresolvable {
            host: domain.to_string(),
            reason: e.to_string(),
        })?;

    // 检查所有解析出的 IP
    for addr in addrs {
        check_ip(addr.ip())?;
    }

    Ok(())
}

fn check_ip(ip: IpAddr) -> Result<(), AddressError> {
    if is_private_ip(ip) {
        return Err(AddressError::Blocked(format!("Private IP {}", ip)));
    }
    Ok(())
}

fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            let octets = ipv4.octets();
            // 10.0.0.0/8
            octets[0] == 10
                // 172.16.0.0/12
                || (octets[0] == 172 && (16..=31).contains(&octets[1]))
                // 192.168.0.0/16
                || (octets[0] == 192 && octets[1] == 168)
                || ipv4.is_loopback()
                || ipv4.is_link_local()
                || ipv4.is_unspecified()
                // 224.0.0.0/4
                || (224..=239).contains(&octets[0])
        }
        IpAddr::V6(ipv6) => {
            if let Some(mapped) = ipv6.to_ipv4_mapped() {
                return is_private_ip(IpAddr::V4(mapped));
            }
            ipv6.is_loopback()
                || ipv6.is_unspecified()
                // Unique Local Address (fc00::/7)
                || (ipv6.segments()[0] & 0xfe00) == 0xfc00
                // Link-local (fe80::/10)
                || (ipv6.segments()[0] & 0xffc0) == 0xfe80
                // Multicast (ff00::/8)
                || (ipv6.segments()[0] & 0xff00) == 0xff00
        }
    }
}
