//! MaxMind GeoLite2 数据库实现
//!
//! 支持 GeoLite2-Country / GeoLite2-City。私有地址、"unknown"
//! 以及库中没有记录的地址使用占位分配。

use std::net::IpAddr;

use maxminddb::Reader;
use tracing::trace;

use crate::analytics::{CountryLookup, assign_country};
use crate::utils::ip::is_private_or_local;

pub struct MaxMindLookup {
    reader: Reader<Vec<u8>>,
}

impl MaxMindLookup {
    pub fn open(path: &str) -> Result<Self, maxminddb::MaxMindDbError> {
        let reader = Reader::open_readfile(path)?;
        Ok(Self { reader })
    }

    fn resolve(&self, ip: &str) -> Option<String> {
        let ip_addr: IpAddr = ip.parse().ok()?;
        if is_private_or_local(&ip_addr) {
            return None;
        }

        let result = self.reader.lookup(ip_addr).ok()?;
        let record: maxminddb::geoip2::Country = result.decode().ok()??;
        record.country.iso_code.map(String::from)
    }
}

impl CountryLookup for MaxMindLookup {
    fn country(&self, ip: &str) -> String {
        let resolved = self.resolve(ip);
        trace!("MaxMind lookup for {}: {:?}", ip, resolved);
        resolved.unwrap_or_else(|| assign_country(ip).to_string())
    }

    fn name(&self) -> &'static str {
        "MaxMind"
    }
}
