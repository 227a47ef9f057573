use ni_core::{InterfaceList, InterfaceModelBuilder, InterfaceRecord};
use serde_json::{Value, json};

use crate::backend::{NetlinkBackend, RouteBackend};
use crate::error::NetlinkError;
use crate::session::NetlinkSession;

/// Query facade over one netlink session.
///
/// Reads reflect the session caches as of the last refresh; only a
/// successful state change re-reads the link cache.
pub struct NetInformer<B: RouteBackend = NetlinkBackend> {
    session: NetlinkSession<B>,
}

impl NetInformer {
    /// Open a session in the calling thread's current network namespace.
    pub fn new() -> Result<Self, NetlinkError> {
        Ok(Self::from_session(NetlinkSession::open()?))
    }
}

impl<B: RouteBackend> NetInformer<B> {
    pub fn from_session(session: NetlinkSession<B>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &NetlinkSession<B> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut NetlinkSession<B> {
        &mut self.session
    }

    /// Names of all links, in link cache order.
    pub fn list_interface_names(&self) -> Vec<String> {
        self.session.snapshot().link_names()
    }

    pub fn get_interface(&self, name: &str) -> Result<InterfaceRecord, NetlinkError> {
        Ok(InterfaceModelBuilder::new(self.session.snapshot()).build_by_name(name)?)
    }

    pub fn get_interface_by_index(&self, index: u32) -> Result<InterfaceRecord, NetlinkError> {
        Ok(InterfaceModelBuilder::new(self.session.snapshot()).build_by_index(index)?)
    }

    pub fn get_all_interfaces(&self) -> Vec<InterfaceRecord> {
        InterfaceModelBuilder::new(self.session.snapshot()).build_all()
    }

    pub fn set_interface_state(&mut self, name: &str, up: bool) -> Result<(), NetlinkError> {
        self.session.set_link_state(name, up)
    }

    pub fn enable_interface(&mut self, name: &str) -> Result<(), NetlinkError> {
        self.set_interface_state(name, true)
    }

    pub fn disable_interface(&mut self, name: &str) -> Result<(), NetlinkError> {
        self.set_interface_state(name, false)
    }

    /// The record for `name` as JSON, or `{"error": "..."}` when the lookup fails.
    pub fn interface_info_json(&self, name: &str) -> Value {
        let result = self
            .get_interface(name)
            .map_err(|e| e.to_string())
            .and_then(|record| serde_json::to_value(record).map_err(|e| e.to_string()));

        match result {
            Ok(value) => value,
            Err(message) => json!({ "error": message }),
        }
    }

    /// `{"interfaces": [...]}` with every link name.
    pub fn interface_names_json(&self) -> Value {
        let list = InterfaceList {
            interfaces: self.list_interface_names(),
        };
        json!(list)
    }
}
