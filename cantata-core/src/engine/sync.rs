//! Event-to-engine translation and queue discipline.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crossbeam_channel::{bounded, Sender, TrySendError};

use cantata_types::{Event, ParamValue};

use super::endpoint::EngineEndpoint;
use super::update::{EngineUpdate, ParamKey};
use crate::bus::{EventBus, SubscriptionToken};

/// Bridges the event bus to the engine queue.
///
/// Structural updates use a blocking send: backpressure stalls the
/// control side, but nothing structural is ever dropped or reordered.
/// Parameter updates use `try_send`; when the queue is full they are
/// parked in a per-parameter last-value-wins map and re-offered before
/// the next push, so a storm of control moves degrades to the newest
/// value per parameter rather than blocking editing.
pub struct SyncController {
    shared: Rc<RefCell<SyncShared>>,
    token: SubscriptionToken,
}

struct SyncShared {
    tx: Sender<EngineUpdate>,
    parked: BTreeMap<ParamKey, f64>,
}

impl SyncController {
    /// Subscribe to every event on the bus and return the controller
    /// together with the endpoint for the engine side.
    pub fn attach(bus: &mut EventBus, capacity: usize) -> (SyncController, EngineEndpoint) {
        let (tx, rx) = bounded(capacity);
        let shared = Rc::new(RefCell::new(SyncShared {
            tx,
            parked: BTreeMap::new(),
        }));
        let handler_shared = Rc::clone(&shared);
        let token = bus.subscribe_all(move |event, _| {
            let mut shared = handler_shared.borrow_mut();
            for update in translate(event) {
                shared.push(update);
            }
            Ok(())
        });
        (SyncController { shared, token }, EngineEndpoint::new(rx))
    }

    /// Force every parked parameter value into the queue, blocking on
    /// backpressure. Call before anything that must observe a fully
    /// converged engine state.
    pub fn flush(&self) {
        self.shared.borrow_mut().flush_parked();
    }

    /// Parameter values currently held back by a full queue.
    pub fn parked_count(&self) -> usize {
        self.shared.borrow().parked.len()
    }

    /// Stop listening. The endpoint drains whatever was already queued
    /// and then reports disconnection.
    pub fn detach(&self) {
        self.token.cancel();
    }
}

impl SyncShared {
    fn push(&mut self, update: EngineUpdate) {
        if update.is_structural() {
            self.flush_parked();
            if self.tx.send(update).is_err() {
                log::warn!(target: "sync", "engine endpoint disconnected");
            }
            return;
        }
        let EngineUpdate::SetParam {
            node_id,
            param,
            value,
        } = update
        else {
            return;
        };
        self.offer_parked();
        let key = ParamKey {
            node: node_id,
            param,
        };
        // Older parked values keep their place in line; a new value
        // behind them parks too so order per parameter holds.
        if !self.parked.is_empty() {
            self.parked.insert(key, value);
            return;
        }
        let attempt = self.tx.try_send(EngineUpdate::SetParam {
            node_id: key.node,
            param: key.param.clone(),
            value,
        });
        match attempt {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.parked.insert(key, value);
            }
            Err(TrySendError::Disconnected(_)) => {
                log::warn!(target: "sync", "engine endpoint disconnected");
            }
        }
    }

    /// Re-offer parked values without blocking, in key order.
    fn offer_parked(&mut self) {
        while let Some((key, value)) = self
            .parked
            .iter()
            .next()
            .map(|(k, v)| (k.clone(), *v))
        {
            let attempt = self.tx.try_send(EngineUpdate::SetParam {
                node_id: key.node,
                param: key.param.clone(),
                value,
            });
            match attempt {
                Ok(()) => {
                    self.parked.remove(&key);
                }
                Err(TrySendError::Full(_)) => return,
                Err(TrySendError::Disconnected(_)) => {
                    log::warn!(target: "sync", "engine endpoint disconnected");
                    self.parked.clear();
                    return;
                }
            }
        }
    }

    /// Push every parked value through, blocking on backpressure.
    fn flush_parked(&mut self) {
        let parked = std::mem::take(&mut self.parked);
        for (key, value) in parked {
            let update = EngineUpdate::SetParam {
                node_id: key.node,
                param: key.param,
                value,
            };
            if self.tx.send(update).is_err() {
                log::warn!(target: "sync", "engine endpoint disconnected");
                return;
            }
        }
    }
}

/// Translate one domain event into engine updates. Events the engine
/// has no use for translate to nothing.
fn translate(event: &Event) -> Vec<EngineUpdate> {
    match event {
        Event::NodeAdded { node } => vec![EngineUpdate::AddNode { node: node.clone() }],
        Event::NodeRemoved { node_id } => vec![EngineUpdate::RemoveNode { node_id: *node_id }],
        // Names are a control-surface concern.
        Event::NodeRenamed { .. } => Vec::new(),
        Event::ConnectionAdded { connection } => vec![EngineUpdate::AddConnection {
            connection: connection.clone(),
        }],
        Event::ConnectionRemoved { connection } => vec![EngineUpdate::RemoveConnection {
            connection_id: connection.id,
        }],
        Event::ParamChanged {
            node_id,
            param,
            value,
        } => match value.as_f64() {
            Some(value) => vec![EngineUpdate::SetParam {
                node_id: *node_id,
                param: param.clone(),
                value,
            }],
            None => {
                if let ParamValue::Text(_) = value {
                    log::debug!(target: "sync", "text param {}.{} not forwarded", node_id, param);
                }
                Vec::new()
            }
        },
        Event::ClipAdded { track_id, clip } => vec![EngineUpdate::AddClip {
            track_id: *track_id,
            clip: clip.clone(),
        }],
        Event::ClipRemoved { track_id, clip_id } => vec![EngineUpdate::RemoveClip {
            track_id: *track_id,
            clip_id: *clip_id,
        }],
        Event::ClipMoved {
            track_id,
            clip_id,
            new_start_beat,
            ..
        } => vec![EngineUpdate::MoveClip {
            track_id: *track_id,
            clip_id: *clip_id,
            start_beat: *new_start_beat,
        }],
        Event::NotesAdded {
            track_id,
            clip_id,
            notes,
        } => vec![EngineUpdate::AddNotes {
            track_id: *track_id,
            clip_id: *clip_id,
            notes: notes.clone(),
        }],
        Event::NotesRemoved {
            track_id,
            clip_id,
            notes,
        } => vec![EngineUpdate::RemoveNotes {
            track_id: *track_id,
            clip_id: *clip_id,
            notes: notes.clone(),
        }],
        Event::AutomationPointAdded {
            node_id,
            param,
            point,
            ..
        } => vec![EngineUpdate::SetAutomationPoint {
            node_id: *node_id,
            param: param.clone(),
            point: *point,
        }],
        Event::AutomationPointRemoved {
            node_id,
            param,
            point,
        } => vec![EngineUpdate::RemoveAutomationPoint {
            node_id: *node_id,
            param: param.clone(),
            beat: point.beat,
        }],
        Event::TempoChanged { bpm } => vec![EngineUpdate::SetTempo { bpm: *bpm }],
        Event::TimeSignatureChanged {
            numerator,
            denominator,
        } => vec![EngineUpdate::SetTimeSignature {
            numerator: *numerator,
            denominator: *denominator,
        }],
        Event::RenderOrderChanged { order } => vec![EngineUpdate::SetRenderOrder {
            order: order.clone(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cantata_types::{Node, NodeId, NodeKind};

    fn node(id: u32) -> Node {
        Node::new(NodeId::new(id), format!("n{}", id), NodeKind::Bus)
    }

    fn param_event(id: u32, value: f64) -> Event {
        Event::ParamChanged {
            node_id: NodeId::new(id),
            param: "volume".into(),
            value: ParamValue::Float(value),
        }
    }

    #[test]
    fn structural_updates_flow_through() {
        let mut bus = EventBus::new();
        let (_controller, mut endpoint) = SyncController::attach(&mut bus, 16);

        bus.publish(Event::NodeAdded { node: node(0) });
        bus.publish(Event::TempoChanged { bpm: 140.0 });

        assert_eq!(endpoint.apply_pending(), 2);
        assert_eq!(endpoint.state().bpm(), 140.0);
        assert_eq!(endpoint.state().node_count(), 1);
    }

    #[test]
    fn param_storm_coalesces_to_last_value() {
        let mut bus = EventBus::new();
        let (controller, mut endpoint) = SyncController::attach(&mut bus, 2);

        bus.publish(Event::NodeAdded { node: node(0) });
        // Queue holds one more update; the rest of the storm parks.
        for value in [-24.0, -18.0, -12.0, -6.0, 0.0] {
            bus.publish(param_event(0, value));
        }
        assert!(controller.parked_count() > 0);

        endpoint.apply_pending();
        controller.flush();
        endpoint.apply_pending();

        assert_eq!(controller.parked_count(), 0);
        assert_eq!(endpoint.state().param(NodeId::new(0), "volume"), Some(0.0));
    }

    #[test]
    fn parked_values_reoffer_on_next_push() {
        let mut bus = EventBus::new();
        let (controller, mut endpoint) = SyncController::attach(&mut bus, 1);

        bus.publish(Event::NodeAdded { node: node(0) }); // fills the queue
        bus.publish(param_event(0, -6.0)); // parks
        assert_eq!(controller.parked_count(), 1);

        endpoint.apply_pending();
        bus.publish(param_event(0, -3.0)); // re-offers -6.0, parks -3.0
        assert_eq!(controller.parked_count(), 1);

        endpoint.apply_pending();
        controller.flush();
        endpoint.apply_pending();

        assert_eq!(controller.parked_count(), 0);
        assert_eq!(endpoint.state().param(NodeId::new(0), "volume"), Some(-3.0));
    }

    #[test]
    fn text_params_are_not_forwarded() {
        let mut bus = EventBus::new();
        let (_controller, mut endpoint) = SyncController::attach(&mut bus, 16);
        bus.publish(Event::NodeAdded { node: node(0) });
        bus.publish(Event::ParamChanged {
            node_id: NodeId::new(0),
            param: "label".into(),
            value: ParamValue::Text("verse".into()),
        });
        assert_eq!(endpoint.apply_pending(), 1);
    }

    #[test]
    fn detach_stops_translation() {
        let mut bus = EventBus::new();
        let (controller, mut endpoint) = SyncController::attach(&mut bus, 16);
        controller.detach();
        bus.publish(Event::TempoChanged { bpm: 99.0 });
        assert_eq!(endpoint.apply_pending(), 0);
    }
}
