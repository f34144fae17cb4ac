//! The facade tying project, history and bus together.
//!
//! Callers mutate exclusively through [`Studio::execute`] (and the
//! undo/redo/macro entry points); every applied change is published on
//! the bus, and any change to the graph topology is followed by a
//! `RenderOrderChanged` event carrying the freshly computed order.

use cantata_types::{Event, EventKind, NodeId};

use crate::bus::{EventBus, EventQueue, HandlerResult, SubscriptionToken};
use crate::command::{Command, CommandManager};
use crate::config::Config;
use crate::error::DomainError;
use crate::project::Project;
use crate::router;

pub struct Studio {
    project: Project,
    manager: CommandManager,
    bus: EventBus,
}

impl Studio {
    /// A studio around an empty project, using the loaded config for
    /// defaults and limits.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, &Config::load())
    }

    pub fn with_config(name: impl Into<String>, config: &Config) -> Self {
        Self {
            project: Project::new(name, config.default_bpm(), config.default_time_signature()),
            manager: CommandManager::new(config.history_depth()),
            bus: EventBus::new(),
        }
    }

    /// Validate, apply and publish a command. Returns the published
    /// events, including the trailing render-order event when the
    /// graph topology changed.
    pub fn execute(&mut self, command: Command) -> Result<Vec<Event>, DomainError> {
        let events = self.manager.execute(&mut self.project, command)?;
        Ok(self.publish_all(events))
    }

    pub fn undo(&mut self) -> Result<Vec<Event>, DomainError> {
        let events = self.manager.undo(&mut self.project)?;
        Ok(self.publish_all(events))
    }

    pub fn redo(&mut self) -> Result<Vec<Event>, DomainError> {
        let events = self.manager.redo(&mut self.project)?;
        Ok(self.publish_all(events))
    }

    pub fn begin_macro(&mut self, description: impl Into<String>) -> Result<(), DomainError> {
        self.manager.begin_macro(description)
    }

    pub fn end_macro(&mut self) -> Result<(), DomainError> {
        self.manager.end_macro()
    }

    pub fn cancel_macro(&mut self) -> Result<Vec<Event>, DomainError> {
        let events = self.manager.cancel_macro(&mut self.project)?;
        Ok(self.publish_all(events))
    }

    pub fn can_undo(&self) -> bool {
        self.manager.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.manager.can_redo()
    }

    pub fn undo_descriptions(&self) -> Vec<&str> {
        self.manager.undo_descriptions()
    }

    // Queries.

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// A detached copy of the whole project, for serialization.
    pub fn snapshot(&self) -> Project {
        self.project.clone()
    }

    pub fn render_order(&self) -> Vec<NodeId> {
        router::render_order(&self.project)
    }

    /// A parameter's effective value at a beat: the automation lane
    /// evaluated there, or the plain value when the parameter has no
    /// lane (or the beat is outside an empty one).
    pub fn param_value_at(&self, node: NodeId, param: &str, beat: f64) -> Option<f64> {
        let parameter = self.project.node(node)?.param(param)?;
        parameter
            .lane
            .as_ref()
            .and_then(|lane| lane.value_at(beat))
            .or_else(|| parameter.value.as_f64())
    }

    // Bus access.

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionToken
    where
        F: FnMut(&Event, &mut EventQueue) -> HandlerResult + 'static,
    {
        self.bus.subscribe(kind, handler)
    }

    pub fn subscribe_all<F>(&mut self, handler: F) -> SubscriptionToken
    where
        F: FnMut(&Event, &mut EventQueue) -> HandlerResult + 'static,
    {
        self.bus.subscribe_all(handler)
    }

    /// Direct bus access, for attaching the sync controller.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    fn publish_all(&mut self, mut events: Vec<Event>) -> Vec<Event> {
        let topology_changed = events.iter().any(Event::is_topology_change);
        for event in &events {
            self.bus.publish(event.clone());
        }
        if topology_changed {
            let order = router::render_order(&self.project);
            let event = Event::RenderOrderChanged { order };
            self.bus.publish(event.clone());
            events.push(event);
        }
        events
    }
}
