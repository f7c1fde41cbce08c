// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Application context: the daemon's singletons, explicitly constructed and
//! threaded through every component.

use crate::bus::EventBus;
use crate::loops::{Dispatcher, Janitor, Scheduler};
use crate::registry::{AgentRegistry, BotRegistry, RunRegistry};
use crate::router::InboundRouter;
use crate::transport::Transport;
use crate::env;
use fleet_core::Clock;
use fleet_storage::Store;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Daemon configuration, environment-driven. All state lives in the store;
/// there is no config file.
#[derive(Debug, Clone)]
pub struct Config {
    pub heartbeat_interval: Duration,
    pub listen_addr: SocketAddr,
    pub dispatch_timeout: Duration,
    pub tick_interval: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            heartbeat_interval: env::heartbeat_interval(),
            listen_addr: env::listen_addr(),
            dispatch_timeout: env::dispatch_timeout(),
            tick_interval: env::tick_interval(),
        }
    }
}

/// Shared context handed to HTTP handlers, socket streams, and loops.
#[derive(Clone)]
pub struct App<C: Clock> {
    pub store: Arc<dyn Store>,
    pub bus: EventBus,
    pub clock: C,
    pub bots: BotRegistry<C>,
    pub agents: AgentRegistry<C>,
    pub runs: RunRegistry<C>,
    pub router: InboundRouter<C>,
    pub config: Config,
}

impl<C: Clock> App<C> {
    pub fn new(store: Arc<dyn Store>, clock: C, config: Config) -> Self {
        let bus = EventBus::new();
        let agents = AgentRegistry::new(
            Arc::clone(&store),
            bus.clone(),
            clock.clone(),
            config.heartbeat_interval,
        );
        let runs = RunRegistry::new(Arc::clone(&store), bus.clone(), clock.clone());
        let bots = BotRegistry::new(Arc::clone(&store), bus.clone(), clock.clone());
        let router = InboundRouter::new(agents.clone(), runs.clone(), bus.clone(), clock.clone());
        Self { store, bus, clock, bots, agents, runs, router, config }
    }

    pub fn scheduler(&self) -> Scheduler<C> {
        Scheduler::new(Arc::clone(&self.store), self.runs.clone(), self.clock.clone())
    }

    pub fn dispatcher(&self, transport: Arc<dyn Transport>) -> Dispatcher<C> {
        Dispatcher::new(
            Arc::clone(&self.store),
            self.runs.clone(),
            self.agents.clone(),
            transport,
            self.clock.clone(),
        )
    }

    pub fn janitor(&self) -> Janitor<C> {
        Janitor::new(
            Arc::clone(&self.store),
            self.runs.clone(),
            self.agents.clone(),
            self.bus.clone(),
            self.clock.clone(),
            self.config.heartbeat_interval,
        )
    }

    /// Spawn the periodic loops; they stop when the token is cancelled.
    pub fn spawn_loops(&self, transport: Arc<dyn Transport>, shutdown: CancellationToken) {
        let period = self.config.tick_interval;
        tokio::spawn(self.scheduler().run(period, shutdown.clone()));
        tokio::spawn(self.dispatcher(transport).run(period, shutdown.clone()));
        tokio::spawn(self.janitor().run(period, shutdown));
    }
}
