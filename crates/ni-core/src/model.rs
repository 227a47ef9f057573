use serde::{Serialize, Serializer};
use std::fmt;

use crate::decode::{self, AF_INET, AF_INET6};

/// Normalized view of one network link and everything attached to it.
///
/// Field names on the wire are fixed; consumers of the JSON output rely on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceRecord {
    #[serde(rename = "interface")]
    pub name: String,
    pub general: General,
    pub hw: Hardware,
    pub operational_status: OperationalStatus,
    pub protocols: Protocols,
    pub rx: TrafficStats,
    pub tx: TrafficStats,
    #[serde(rename = "ip")]
    pub addresses: Vec<IpAddress>,
    pub routes: Vec<RouteEntry>,
    #[serde(rename = "neigh")]
    pub neighbours: Vec<NeighbourEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct General {
    pub index: u32,
    pub state: AdminState,
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub flags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hardware {
    #[serde(rename = "type")]
    pub kind: String,
    pub mac: Vec<String>,
    pub mtu: u64,
    pub size_queue: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationalStatus {
    pub oper_state: OperState,
    pub link_mode: LinkMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Protocols {
    pub routing_ipv4: bool,
    pub multicast: bool,
}

/// Kernel link counters since the link was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TrafficStats {
    pub bytes: u64,
    pub packets: u64,
    pub errors: u64,
    pub drops: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpAddress {
    #[serde(rename = "type")]
    pub family: AddressFamily,
    #[serde(rename = "ip")]
    pub address: String,
    #[serde(rename = "masc")]
    pub prefix_length: u8,
    pub flags: Vec<String>,
    #[serde(rename = "valid_lft", skip_serializing_if = "Option::is_none")]
    pub valid_lifetime_seconds: Option<u32>,
    #[serde(rename = "pref_lft", skip_serializing_if = "Option::is_none")]
    pub preferred_lifetime_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broadcast: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub destination: String,
    #[serde(rename = "gateway")]
    pub next_hop: String,
    pub metric: u32,
    pub table: u32,
    #[serde(rename = "type")]
    pub route_type: RouteType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NeighbourEntry {
    #[serde(rename = "ip")]
    pub address: String,
    #[serde(rename = "mac", skip_serializing_if = "Option::is_none")]
    pub link_address: Option<String>,
    #[serde(rename = "type")]
    pub states: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AdminState {
    #[serde(rename = "UP")]
    Up,
    #[serde(rename = "DOWN")]
    Down,
}

impl AdminState {
    pub fn from_flags(flags: u32) -> Self {
        if flags & decode::IFF_UP != 0 {
            Self::Up
        } else {
            Self::Down
        }
    }
}

impl fmt::Display for AdminState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkType {
    #[serde(rename = "LOOPBACK")]
    Loopback,
    #[serde(rename = "BROADCAST")]
    Broadcast,
    #[serde(rename = "POINT-TO-POINT")]
    PointToPoint,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl LinkType {
    /// Classify a link from its flags; loopback wins over broadcast, which
    /// wins over point-to-point.
    pub fn from_flags(flags: u32) -> Self {
        if flags & decode::IFF_LOOPBACK != 0 {
            Self::Loopback
        } else if flags & decode::IFF_BROADCAST != 0 {
            Self::Broadcast
        } else if flags & decode::IFF_POINTOPOINT != 0 {
            Self::PointToPoint
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Loopback => "LOOPBACK",
            Self::Broadcast => "BROADCAST",
            Self::PointToPoint => "POINT-TO-POINT",
            Self::Unknown => "UNKNOWN",
        })
    }
}

/// RFC 2863 operational state as reported in `IFLA_OPERSTATE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OperState {
    #[serde(rename = "UNKNOWN")]
    Unknown,
    #[serde(rename = "NOT PRESENT")]
    NotPresent,
    #[serde(rename = "DOWN")]
    Down,
    #[serde(rename = "LOWER LAYER DOWN")]
    LowerLayerDown,
    #[serde(rename = "TESTING")]
    Testing,
    #[serde(rename = "DORMANT")]
    Dormant,
    #[serde(rename = "UP")]
    Up,
    #[serde(rename = "UNDEFINED")]
    Undefined,
}

impl From<u8> for OperState {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::Unknown,
            1 => Self::NotPresent,
            2 => Self::Down,
            3 => Self::LowerLayerDown,
            4 => Self::Testing,
            5 => Self::Dormant,
            6 => Self::Up,
            _ => Self::Undefined,
        }
    }
}

impl fmt::Display for OperState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "UNKNOWN",
            Self::NotPresent => "NOT PRESENT",
            Self::Down => "DOWN",
            Self::LowerLayerDown => "LOWER LAYER DOWN",
            Self::Testing => "TESTING",
            Self::Dormant => "DORMANT",
            Self::Up => "UP",
            Self::Undefined => "UNDEFINED",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkMode {
    #[serde(rename = "DEFAULT")]
    Default,
    #[serde(rename = "DORMANT")]
    Dormant,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl From<u8> for LinkMode {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::Default,
            1 => Self::Dormant,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for LinkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Default => "DEFAULT",
            Self::Dormant => "DORMANT",
            Self::Unknown => "UNKNOWN",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
    Unknown(u8),
}

impl From<u8> for AddressFamily {
    fn from(code: u8) -> Self {
        match code {
            AF_INET => Self::Ipv4,
            AF_INET6 => Self::Ipv6,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ipv4 => f.write_str("IPv4"),
            Self::Ipv6 => f.write_str("IPv6"),
            Self::Unknown(code) => write!(f, "unknown({code})"),
        }
    }
}

impl Serialize for AddressFamily {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// `RTN_*` route type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RouteType {
    Unicast,
    Local,
    Broadcast,
    Anycast,
    Multicast,
    Blackhole,
    Unreachable,
    Prohibit,
    Throw,
    Nat,
    Xresolve,
    Unknown,
}

impl From<u8> for RouteType {
    fn from(code: u8) -> Self {
        match code {
            1 => Self::Unicast,
            2 => Self::Local,
            3 => Self::Broadcast,
            4 => Self::Anycast,
            5 => Self::Multicast,
            6 => Self::Blackhole,
            7 => Self::Unreachable,
            8 => Self::Prohibit,
            9 => Self::Throw,
            10 => Self::Nat,
            11 => Self::Xresolve,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unicast => "UNICAST",
            Self::Local => "LOCAL",
            Self::Broadcast => "BROADCAST",
            Self::Anycast => "ANYCAST",
            Self::Multicast => "MULTICAST",
            Self::Blackhole => "BLACKHOLE",
            Self::Unreachable => "UNREACHABLE",
            Self::Prohibit => "PROHIBIT",
            Self::Throw => "THROW",
            Self::Nat => "NAT",
            Self::Xresolve => "XRESOLVE",
            Self::Unknown => "UNKNOWN",
        })
    }
}

/// Wrapper for the `{"interfaces": [...]}` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceList {
    pub interfaces: Vec<String>,
}
