//! AfPacketOrch implementation.
//!
//! Decides, for every AF_PACKET request, whether the dataplane can be called
//! now or whether the interface has to wait for its host interface, and
//! moves interfaces between the pending and active states as host
//! interfaces come and go.

use async_trait::async_trait;
use ifagent_dataplane::api::AfPacketParams;
use ifagent_dataplane::{DeviceError, DeviceResult, SwIfIndex};
use ifagent_orch_common::{Consumer, ConsumerConfig, Orch};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::cache::AfPacketCache;
use super::host_if::{HostIfEvent, HostInterfaceSet};
use super::types::{
    af_packet_params, AfPacketLink, ConfigureOutcome, InterfaceDescriptor, InterfaceType,
};

/// Error type for AfPacketOrch operations.
#[derive(Debug, thiserror::Error)]
pub enum AfPacketOrchError {
    #[error("Expecting AF_PACKET interface, {name} has type {found}")]
    InvalidInterfaceType { name: String, found: InterfaceType },

    #[error("AF_PACKET interface {name} has no host interface binding")]
    MissingAfPacketLink { name: String },

    #[error("Invalid AF_PACKET parameters for {name}: {source}")]
    InvalidParams {
        name: String,
        #[source]
        source: DeviceError,
    },

    #[error(transparent)]
    DeviceCallFailed(#[from] DeviceError),

    #[error("Host interface {host_if_name} is already bound to AF_PACKET interface {owner}, cannot bind {name}")]
    HostInterfaceInUse {
        name: String,
        host_if_name: String,
        owner: String,
    },

    #[error("Cannot rename AF_PACKET interface {from} to {name}: name already in use")]
    InterfaceNameInUse { name: String, from: String },

    #[error("No dataplane callbacks set")]
    CallbacksNotSet,
}

/// Result type for AfPacketOrch operations.
pub type Result<T> = std::result::Result<T, AfPacketOrchError>;

/// Configuration for AfPacketOrch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AfPacketOrchConfig {
    /// Whether host interface notifications are delivered to this
    /// orchestrator. When false, every configure request goes straight to
    /// the dataplane.
    #[serde(default = "default_host_if_tracking")]
    pub host_if_tracking: bool,

    /// Maximum number of host interface events handled per `do_task`.
    #[serde(default = "default_event_batch_size")]
    pub event_batch_size: usize,
}

impl Default for AfPacketOrchConfig {
    fn default() -> Self {
        Self {
            host_if_tracking: default_host_if_tracking(),
            event_batch_size: default_event_batch_size(),
        }
    }
}

fn default_host_if_tracking() -> bool {
    true
}

fn default_event_batch_size() -> usize {
    128
}

/// Dataplane calls made by AfPacketOrch.
///
/// Calls are synchronous and may block; timeouts belong to the
/// implementation.
pub trait AfPacketOrchCallbacks: Send + Sync {
    /// Creates an AF_PACKET interface and returns its handle.
    fn create_af_packet(&self, params: &AfPacketParams) -> DeviceResult<SwIfIndex>;

    /// Removes an AF_PACKET interface.
    fn delete_af_packet(&self, params: &AfPacketParams) -> DeviceResult<()>;
}

/// AfPacketOrch statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AfPacketOrchStats {
    /// Interfaces created in the dataplane.
    pub interfaces_created: u64,
    /// Interfaces removed from the dataplane.
    pub interfaces_deleted: u64,
    /// Configure requests deferred for a missing host interface.
    pub interfaces_deferred: u64,
    /// In-place modifications.
    pub interfaces_modified: u64,
    /// Pending interfaces released by a host interface appearing.
    pub promotions: u64,
    /// Interfaces returned to pending by a host interface vanishing.
    pub demotions: u64,
    /// Failed dataplane calls.
    pub device_errors: u64,
    /// Notifications that contradict the cached state.
    pub unexpected_events: u64,
    /// Notifications for host interfaces no AF_PACKET interface uses.
    pub untracked_events: u64,
}

/// Orchestrator for AF_PACKET interfaces.
///
/// An AF_PACKET interface can only be created once its host interface
/// exists. Requests for a missing host interface are cached as pending and
/// released when the host interface appears; active interfaces whose host
/// interface vanishes are deleted and cached as pending again.
///
/// # Serialization
///
/// All methods take `&mut self` and the orchestrator holds no lock of its
/// own. Callers that share it (the daemon loop and the upstream request
/// path) must wrap it in a mutex.
pub struct AfPacketOrch {
    config: AfPacketOrchConfig,
    cache: AfPacketCache,
    host_interfaces: HostInterfaceSet,
    events: Consumer<HostIfEvent>,
    callbacks: Option<Arc<dyn AfPacketOrchCallbacks>>,
    stats: AfPacketOrchStats,
}

impl std::fmt::Debug for AfPacketOrch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AfPacketOrch")
            .field("config", &self.config)
            .field("interface_count", &self.cache.len())
            .field("host_interface_count", &self.host_interfaces.len())
            .field("queued_events", &self.events.pending_count())
            .field("stats", &self.stats)
            .finish()
    }
}

impl AfPacketOrch {
    /// Creates a new AfPacketOrch with the given configuration.
    pub fn new(config: AfPacketOrchConfig) -> Self {
        let events = Consumer::new(
            ConsumerConfig::new("host-interfaces").with_batch_size(config.event_batch_size),
        );
        Self {
            config,
            cache: AfPacketCache::new(),
            host_interfaces: HostInterfaceSet::new(),
            events,
            callbacks: None,
            stats: AfPacketOrchStats::default(),
        }
    }

    /// Sets the dataplane callbacks.
    pub fn set_callbacks(&mut self, callbacks: Arc<dyn AfPacketOrchCallbacks>) {
        self.callbacks = Some(callbacks);
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AfPacketOrchConfig {
        &self.config
    }

    /// Returns the statistics.
    pub fn stats(&self) -> &AfPacketOrchStats {
        &self.stats
    }

    /// Returns the number of cached AF_PACKET interfaces.
    pub fn interface_count(&self) -> usize {
        self.cache.len()
    }

    /// Returns the names of pending interfaces, sorted.
    pub fn pending_interfaces(&self) -> Vec<String> {
        self.cache
            .pending()
            .into_iter()
            .map(|entry| entry.config.name.clone())
            .collect()
    }

    /// Returns true if the host interface is currently known to exist.
    pub fn host_interface_known(&self, name: &str) -> bool {
        self.host_interfaces.contains(name)
    }

    /// Returns the cache (read-only).
    pub fn cache(&self) -> &AfPacketCache {
        &self.cache
    }

    /// Creates an AF_PACKET interface, or caches it as pending if its host
    /// interface does not exist yet.
    ///
    /// A pending outcome is not a failure. On a dataplane failure nothing is
    /// cached and the device error is returned unchanged. A host interface
    /// already bound to another AF_PACKET interface is rejected with
    /// [`AfPacketOrchError::HostInterfaceInUse`] before any side effect.
    pub fn configure_af_packet(
        &mut self,
        afpacket: &InterfaceDescriptor,
    ) -> Result<ConfigureOutcome> {
        let link = expect_af_packet(afpacket)?;
        let params = checked_params(link, afpacket)?;
        self.ensure_host_if_free(&link.host_if_name, &afpacket.name)?;

        if self.config.host_if_tracking && !self.host_interfaces.contains(&link.host_if_name) {
            self.cache.put(afpacket.clone(), true);
            self.stats.interfaces_deferred += 1;
            info!(
                "AF_PACKET interface {} pending until host interface {} appears",
                afpacket.name, link.host_if_name
            );
            return Ok(ConfigureOutcome::Pending);
        }

        let callbacks = self.callbacks()?;
        let sw_if_index = callbacks.create_af_packet(&params).map_err(|e| {
            self.stats.device_errors += 1;
            AfPacketOrchError::from(e)
        })?;

        self.cache.put(afpacket.clone(), false);
        self.stats.interfaces_created += 1;
        info!(
            "Created AF_PACKET interface {} on host interface {} (sw_if_index {})",
            afpacket.name, link.host_if_name, sw_if_index
        );
        Ok(ConfigureOutcome::Created(sw_if_index))
    }

    /// Applies a modification and tells the caller whether the interface
    /// has to be recreated.
    ///
    /// Returns `true` (cache untouched) when the old interface is unknown or
    /// pending, or when the host interface changes; the caller then deletes
    /// and configures again. Otherwise the cached descriptor is replaced and
    /// `false` is returned; no dataplane call is made here.
    ///
    /// Renaming onto a name that is already cached is rejected with
    /// [`AfPacketOrchError::InterfaceNameInUse`], leaving both entries as
    /// they were.
    pub fn modify_af_packet(
        &mut self,
        new_config: &InterfaceDescriptor,
        old_config: &InterfaceDescriptor,
    ) -> Result<bool> {
        let old_link = expect_af_packet(old_config)?;
        let new_link = expect_af_packet(new_config)?;
        checked_params(new_link, new_config)?;

        if new_config.name != old_config.name && self.cache.lookup_by_name(&new_config.name).is_some()
        {
            return Err(AfPacketOrchError::InterfaceNameInUse {
                name: new_config.name.clone(),
                from: old_config.name.clone(),
            });
        }

        let recreate = match self.cache.lookup_by_name(&old_config.name) {
            None => true,
            Some(entry) => entry.is_pending() || new_link.host_if_name != old_link.host_if_name,
        };
        if recreate {
            debug!(
                "AF_PACKET interface {} must be recreated (hostIf: {} -> {})",
                old_config.name, old_link.host_if_name, new_link.host_if_name
            );
            return Ok(true);
        }
        self.ensure_host_if_free(&new_link.host_if_name, &old_config.name)?;

        if new_config.name != old_config.name {
            self.cache.remove(old_config);
        }
        self.cache.put(new_config.clone(), false);
        self.stats.interfaces_modified += 1;
        Ok(false)
    }

    /// Removes an AF_PACKET interface from the dataplane and the cache.
    ///
    /// The dataplane call is skipped for pending interfaces and attempted
    /// for everything else, including interfaces this orchestrator does not
    /// know. The cache entry is removed whatever the outcome; a device error
    /// is still returned.
    pub fn delete_af_packet(&mut self, afpacket: &InterfaceDescriptor) -> Result<()> {
        let link = expect_af_packet(afpacket)?;

        let pending = self
            .cache
            .lookup_by_name(&afpacket.name)
            .is_some_and(|entry| entry.is_pending());

        let result = if pending {
            debug!(
                "AF_PACKET interface {} is pending, nothing to delete in the dataplane",
                afpacket.name
            );
            Ok(())
        } else {
            let params = af_packet_params(link, afpacket);
            self.callbacks().and_then(|callbacks| {
                callbacks
                    .delete_af_packet(&params)
                    .map_err(AfPacketOrchError::from)
            })
        };

        self.cache.remove(afpacket);

        match &result {
            Ok(()) if !pending => {
                self.stats.interfaces_deleted += 1;
                info!("Deleted AF_PACKET interface {}", afpacket.name);
            }
            Ok(()) => {}
            Err(e) => {
                self.stats.device_errors += 1;
                warn!("Failed to delete AF_PACKET interface {}: {}", afpacket.name, e);
            }
        }
        result
    }

    /// Returns true if the interface is cached as pending.
    pub fn is_pending_af_packet(&self, iface: &InterfaceDescriptor) -> bool {
        self.cache
            .lookup_by_name(&iface.name)
            .is_some_and(|entry| entry.is_pending())
    }

    /// Reacts to a newly created host interface.
    ///
    /// Returns the descriptor of the pending AF_PACKET interface bound to
    /// it, if any. The caller configures it again; this method makes no
    /// dataplane call.
    pub fn resolve_created_host_interface(
        &mut self,
        host_if_name: &str,
        host_if_index: u32,
    ) -> Option<InterfaceDescriptor> {
        let already_known = !self.host_interfaces.insert(host_if_name);

        if !self.config.host_if_tracking {
            warn!(
                "Unexpectedly learned about a new host interface {} (index {})",
                host_if_name, host_if_index
            );
            self.stats.unexpected_events += 1;
            return None;
        }

        match self.cache.lookup_by_host_if(host_if_name) {
            Some(entry) if entry.is_pending() => {
                info!(
                    "Host interface {} appeared, AF_PACKET interface {} can be created",
                    host_if_name, entry.config.name
                );
                self.stats.promotions += 1;
                Some(entry.config.clone())
            }
            Some(entry) => {
                warn!(
                    "Already configured AF_PACKET interface {} (hostIfName: {}, reported again: {})",
                    entry.config.name, host_if_name, already_known
                );
                self.stats.unexpected_events += 1;
                None
            }
            None => {
                debug!(
                    "Host interface {} (index {}) is not used by any AF_PACKET interface",
                    host_if_name, host_if_index
                );
                self.stats.untracked_events += 1;
                None
            }
        }
    }

    /// Reacts to a removed host interface.
    ///
    /// An AF_PACKET interface bound to it is deleted and immediately
    /// configured again, which leaves it pending. A delete failure is
    /// returned after the interface has been re-queued.
    pub fn resolve_deleted_host_interface(&mut self, host_if_name: &str) -> Result<()> {
        self.host_interfaces.remove(host_if_name);

        if !self.config.host_if_tracking {
            warn!(
                "Unexpectedly learned about removed host interface {}",
                host_if_name
            );
            self.stats.unexpected_events += 1;
            return Ok(());
        }

        let Some(config) = self
            .cache
            .lookup_by_host_if(host_if_name)
            .map(|entry| entry.config.clone())
        else {
            debug!(
                "Removed host interface {} is not used by any AF_PACKET interface",
                host_if_name
            );
            self.stats.untracked_events += 1;
            return Ok(());
        };

        info!(
            "Host interface {} vanished, AF_PACKET interface {} returns to pending",
            host_if_name, config.name
        );
        let deleted = self.delete_af_packet(&config);
        let configured = self.configure_af_packet(&config);
        self.stats.demotions += 1;

        deleted?;
        configured.map(|_| ())
    }

    /// Queues host interface notifications for the next `do_task`.
    pub fn add_host_if_events(&mut self, events: impl IntoIterator<Item = HostIfEvent>) {
        self.events.add_to_sync(events);
    }

    fn process_host_if_event(&mut self, event: HostIfEvent) {
        match event {
            HostIfEvent::Appeared { name, index } => {
                let Some(config) = self.resolve_created_host_interface(&name, index) else {
                    return;
                };
                match self.configure_af_packet(&config) {
                    Ok(ConfigureOutcome::Created(_)) => {}
                    Ok(ConfigureOutcome::Pending) => {
                        debug!("AF_PACKET interface {} is still pending", config.name);
                    }
                    Err(e) => {
                        error!("Failed to create AF_PACKET interface {}: {}", config.name, e);
                    }
                }
            }
            HostIfEvent::Vanished { name } => {
                if let Err(e) = self.resolve_deleted_host_interface(&name) {
                    error!(
                        "Failed to release AF_PACKET interface on host interface {}: {}",
                        name, e
                    );
                }
            }
        }
    }

    fn ensure_host_if_free(&self, host_if_name: &str, name: &str) -> Result<()> {
        match self.cache.owner_of_host_if(host_if_name) {
            Some(owner) if owner != name => Err(AfPacketOrchError::HostInterfaceInUse {
                name: name.to_string(),
                host_if_name: host_if_name.to_string(),
                owner: owner.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn callbacks(&self) -> Result<Arc<dyn AfPacketOrchCallbacks>> {
        self.callbacks
            .as_ref()
            .map(Arc::clone)
            .ok_or(AfPacketOrchError::CallbacksNotSet)
    }
}

#[async_trait]
impl Orch for AfPacketOrch {
    fn name(&self) -> &str {
        "AfPacketOrch"
    }

    async fn do_task(&mut self) {
        for event in self.events.drain() {
            self.process_host_if_event(event);
        }
    }

    fn priority(&self) -> i32 {
        5
    }

    fn has_pending_tasks(&self) -> bool {
        self.events.has_pending()
    }

    fn dump_pending_tasks(&self) -> Vec<String> {
        self.cache
            .pending()
            .into_iter()
            .map(|entry| {
                format!(
                    "{}: waiting for host interface {}",
                    entry.config.name,
                    entry.config.host_if_name().unwrap_or_default()
                )
            })
            .chain(self.events.dump())
            .collect()
    }
}

fn expect_af_packet(desc: &InterfaceDescriptor) -> Result<&AfPacketLink> {
    if desc.if_type != InterfaceType::AfPacket {
        return Err(AfPacketOrchError::InvalidInterfaceType {
            name: desc.name.clone(),
            found: desc.if_type,
        });
    }
    desc.afpacket
        .as_ref()
        .ok_or_else(|| AfPacketOrchError::MissingAfPacketLink {
            name: desc.name.clone(),
        })
}

fn checked_params(link: &AfPacketLink, desc: &InterfaceDescriptor) -> Result<AfPacketParams> {
    let params = af_packet_params(link, desc);
    params
        .validate()
        .map_err(|source| AfPacketOrchError::InvalidParams {
            name: desc.name.clone(),
            source,
        })?;
    Ok(params)
}
