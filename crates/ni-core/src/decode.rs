// Kernel code tables: link/address/neighbour flag bits, hardware types,
// operational states and address families.

use std::net::IpAddr;

/// Value the kernel uses for an address lifetime that never expires.
pub const INFINITE_LIFETIME: u32 = 0xFFFF_FFFF;

pub const AF_INET: u8 = 2;
pub const AF_INET6: u8 = 10;

// Bit values from <linux/if.h>, <linux/if_addr.h> and <linux/neighbour.h>.
// They match what netlink-packet-route's flag enums fold back into.
pub const IFF_UP: u32 = 0x1;
pub const IFF_BROADCAST: u32 = 0x2;
pub const IFF_DEBUG: u32 = 0x4;
pub const IFF_LOOPBACK: u32 = 0x8;
pub const IFF_POINTOPOINT: u32 = 0x10;
pub const IFF_RUNNING: u32 = 0x40;
pub const IFF_NOARP: u32 = 0x80;
pub const IFF_PROMISC: u32 = 0x100;
pub const IFF_ALLMULTI: u32 = 0x200;
pub const IFF_MASTER: u32 = 0x400;
pub const IFF_SLAVE: u32 = 0x800;
pub const IFF_MULTICAST: u32 = 0x1000;
pub const IFF_PORTSEL: u32 = 0x2000;
pub const IFF_AUTOMEDIA: u32 = 0x4000;
pub const IFF_DYNAMIC: u32 = 0x8000;

pub const IFA_F_SECONDARY: u32 = 0x01;
pub const IFA_F_TEMPORARY: u32 = IFA_F_SECONDARY;
pub const IFA_F_NODAD: u32 = 0x02;
pub const IFA_F_OPTIMISTIC: u32 = 0x04;
pub const IFA_F_HOMEADDRESS: u32 = 0x10;
pub const IFA_F_DEPRECATED: u32 = 0x20;
pub const IFA_F_TENTATIVE: u32 = 0x40;
pub const IFA_F_PERMANENT: u32 = 0x80;

pub const NUD_INCOMPLETE: u16 = 0x01;
pub const NUD_REACHABLE: u16 = 0x02;
pub const NUD_STALE: u16 = 0x04;
pub const NUD_DELAY: u16 = 0x08;
pub const NUD_PROBE: u16 = 0x10;
pub const NUD_FAILED: u16 = 0x20;
pub const NUD_NOARP: u16 = 0x40;
pub const NUD_PERMANENT: u16 = 0x80;

/// Link flags in the order they are reported. Bits not listed here are dropped.
const LINK_FLAGS: [(u32, &str); 15] = [
    (IFF_UP, "UP"),
    (IFF_BROADCAST, "BROADCAST"),
    (IFF_DEBUG, "DEBUG"),
    (IFF_LOOPBACK, "LOOPBACK"),
    (IFF_POINTOPOINT, "POINTOPOINT"),
    (IFF_RUNNING, "RUNNING"),
    (IFF_NOARP, "NOARP"),
    (IFF_PROMISC, "PROMISC"),
    (IFF_ALLMULTI, "ALLMULTI"),
    (IFF_MASTER, "MASTER"),
    (IFF_SLAVE, "SLAVE"),
    (IFF_MULTICAST, "MULTICAST"),
    (IFF_PORTSEL, "PORTSEL"),
    (IFF_AUTOMEDIA, "AUTOMEDIA"),
    (IFF_DYNAMIC, "DYNAMIC"),
];

// IFA_F_TEMPORARY shares its bit with IFA_F_SECONDARY.
const ADDRESS_FLAGS: [(u32, &str); 8] = [
    (IFA_F_PERMANENT, "PERMANENT"),
    (IFA_F_SECONDARY, "SECONDARY"),
    (IFA_F_TENTATIVE, "TENTATIVE"),
    (IFA_F_DEPRECATED, "DEPRECATED"),
    (IFA_F_HOMEADDRESS, "HOME"),
    (IFA_F_NODAD, "NODAD"),
    (IFA_F_OPTIMISTIC, "OPTIMISTIC"),
    (IFA_F_TEMPORARY, "TEMPORARY"),
];

const NEIGHBOUR_STATES: [(u16, &str); 8] = [
    (NUD_INCOMPLETE, "INCOMPLETE"),
    (NUD_REACHABLE, "REACHABLE"),
    (NUD_STALE, "STALE"),
    (NUD_DELAY, "DELAY"),
    (NUD_PROBE, "PROBE"),
    (NUD_FAILED, "FAILED"),
    (NUD_NOARP, "NOARP"),
    (NUD_PERMANENT, "PERMANENT"),
];

fn tokens<T>(bits: T, table: &[(T, &str)]) -> Vec<String>
where
    T: Copy + std::ops::BitAnd<Output = T> + PartialEq + Default,
{
    table
        .iter()
        .filter(|(bit, _)| bits & *bit != T::default())
        .map(|(_, name)| (*name).to_string())
        .collect()
}

/// Decode an `IFF_*` bitmask into flag tokens in canonical order.
pub fn link_flags(flags: u32) -> Vec<String> {
    tokens(flags, &LINK_FLAGS)
}

/// Decode an `IFA_F_*` bitmask into address flag tokens.
pub fn address_flags(flags: u32) -> Vec<String> {
    tokens(flags, &ADDRESS_FLAGS)
}

/// Decode a `NUD_*` bitmask into neighbour state tokens.
pub fn neighbour_states(state: u16) -> Vec<String> {
    tokens(state, &NEIGHBOUR_STATES)
}

/// Human-readable name of an `ARPHRD_*` hardware type.
pub fn hardware_type(code: u16) -> String {
    let name = match code {
        1 => "Ethernet",
        772 => "Loopback",
        512 => "PPP",
        256 => "SLIP",
        32 => "InfiniBand",
        768 => "IPIP Tunnel",
        769 => "IPv6 Tunnel",
        801 => "IEEE 802.11",
        24 => "IEEE 1394",
        other => return format!("unknown({other})"),
    };
    name.to_string()
}

/// Format a link-layer address as lowercase colon-separated octets.
///
/// Returns `None` for an empty address.
pub fn hw_address(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    let parts: Vec<String> = bytes.iter().map(|b| format!("{b:02x}")).collect();
    Some(parts.join(":"))
}

/// Format a route destination prefix. The length is omitted for host routes.
pub fn prefix(addr: &IpAddr, len: u8) -> String {
    let full = match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    };
    if len == full {
        addr.to_string()
    } else {
        format!("{addr}/{len}")
    }
}

/// Address family code for an IP address.
pub fn family_of(addr: &IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => AF_INET,
        IpAddr::V6(_) => AF_INET6,
    }
}
