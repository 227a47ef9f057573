//! Human-readable text output for interface records.

use std::fmt;

use crate::model::{AdminState, InterfaceRecord, IpAddress, NeighbourEntry, RouteEntry, TrafficStats};

const RULE: &str = "==================================================================";
const SIZE_UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Format a byte count with a 1024 base, e.g. `1536` -> `1.50 KB`.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;

    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, SIZE_UNITS[0])
    } else {
        format!("{:.2} {}", size, SIZE_UNITS[unit])
    }
}

impl InterfaceRecord {
    pub fn display(&self) {
        println!("{}", self);
    }
}

impl fmt::Display for InterfaceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", RULE)?;
        writeln!(f, "INTERFACE: {}", self.name)?;
        writeln!(f, "{}", RULE)?;

        writeln!(f, "General:")?;
        writeln!(f, "  Index: {}", self.general.index)?;
        let state = match self.general.state {
            AdminState::Up => "ACTIVE (UP)",
            AdminState::Down => "INACTIVE (DOWN)",
        };
        writeln!(f, "  State: {}", state)?;
        writeln!(f, "  Type: {}", self.general.link_type)?;
        writeln!(f, "  Flags: {}", self.general.flags.join(" "))?;

        writeln!(f, "\nHardware:")?;
        writeln!(f, "  Address type: {}", self.hw.kind)?;
        for mac in &self.hw.mac {
            writeln!(f, "  MAC: {}", mac)?;
        }
        writeln!(f, "  MTU: {} bytes", self.hw.mtu)?;
        writeln!(f, "  TX queue length: {}", self.hw.size_queue)?;

        writeln!(f, "\nOperational status:")?;
        writeln!(f, "  State: {}", self.operational_status.oper_state)?;
        writeln!(f, "  Link mode: {}", self.operational_status.link_mode)?;

        writeln!(f, "\nStatistics:")?;
        write_stats(f, "Received", &self.rx)?;
        write_stats(f, "Sent", &self.tx)?;

        writeln!(f, "\nProtocols:")?;
        writeln!(f, "  IPv4 routing: {}", on_off(self.protocols.routing_ipv4))?;
        writeln!(f, "  Multicast: {}", on_off(self.protocols.multicast))?;

        writeln!(f, "\nIP addresses:")?;
        if self.addresses.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for addr in &self.addresses {
            write_address(f, addr)?;
        }

        if self.neighbours.is_empty() {
            writeln!(f, "\nNeighbours: (none)")?;
        } else {
            writeln!(f, "\nNeighbours (ARP/NDP):")?;
            for neigh in &self.neighbours {
                write_neighbour(f, neigh)?;
            }
        }

        if self.routes.is_empty() {
            write!(f, "\nRoutes: (none)")
        } else {
            write!(f, "\nRoutes:")?;
            for route in &self.routes {
                writeln!(f)?;
                write_route(f, route)?;
            }
            Ok(())
        }
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}

fn write_stats(f: &mut fmt::Formatter<'_>, label: &str, stats: &TrafficStats) -> fmt::Result {
    writeln!(f, "  {}:", label)?;
    writeln!(f, "    Bytes: {} ({})", stats.bytes, format_size(stats.bytes))?;
    writeln!(f, "    Packets: {}", stats.packets)?;
    writeln!(f, "    Errors: {}", stats.errors)?;
    writeln!(f, "    Dropped: {}", stats.drops)
}

fn write_address(f: &mut fmt::Formatter<'_>, addr: &IpAddress) -> fmt::Result {
    write!(
        f,
        "  {}: {}/{} [{}]",
        addr.family,
        addr.address,
        addr.prefix_length,
        addr.flags.join(" ")
    )?;
    if let Some(valid) = addr.valid_lifetime_seconds {
        write!(f, " valid_lft={}s", valid)?;
    }
    if let Some(preferred) = addr.preferred_lifetime_seconds {
        write!(f, " pref_lft={}s", preferred)?;
    }
    writeln!(f)?;

    if let Some(broadcast) = &addr.broadcast {
        writeln!(f, "    Broadcast: {}", broadcast)?;
    }
    if let Some(peer) = &addr.peer {
        writeln!(f, "    Peer: {}", peer)?;
    }
    Ok(())
}

fn write_neighbour(f: &mut fmt::Formatter<'_>, neigh: &NeighbourEntry) -> fmt::Result {
    writeln!(
        f,
        "  {} => {} [{}]",
        neigh.address,
        neigh.link_address.as_deref().unwrap_or("(unknown)"),
        neigh.states.join(" ")
    )
}

fn write_route(f: &mut fmt::Formatter<'_>, route: &RouteEntry) -> fmt::Result {
    write!(
        f,
        "  {} via {} metric {} table {} [{}]",
        route.destination, route.next_hop, route.metric, route.table, route.route_type
    )
}
