//! View Module - Display and control contracts for the front-end
//!
//! The library draws nothing itself. It fixes the contract a front-end
//! view fulfils, owns the view cache, and runs the propagation pass that
//! feeds changed devices into their views after a tick.
//!
//! Views read [`BoardSnapshot`]s, never live device state, and controls
//! emit [`Command`]s instead of mutating anything. Both rules together
//! keep every device mutation on the tick thread.

use crate::board::{BoardSnapshot, Command, StepReport};
use crate::types::{DeviceKind, PORT_COUNT, PortId};

// =============================================================================
// CONTRACTS
// =============================================================================

/// One rendered device: a port panel, the brick, a motor readout.
pub trait DisplayView {
    /// The device kind this view renders.
    fn kind(&self) -> DeviceKind;

    /// The port this view watches.
    fn port(&self) -> PortId;

    /// Refresh the view from a snapshot.
    fn update_state(&mut self, board: &BoardSnapshot);

    /// Whether the view needs a redraw. Edge-triggered: a true read
    /// marks the view rendered.
    fn did_change(&mut self) -> bool;

    /// Whether the interactive control overlay is open.
    fn selected(&self) -> bool {
        false
    }

    /// Open or close the interactive control overlay.
    fn set_selected(&mut self, _on: bool) {}
}

/// Abstract input a control overlay reacts to, already stripped of any
/// front-end key mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlInput {
    /// Raise the controlled value or move to the next option.
    Increase,
    /// Lower the controlled value or move to the previous option.
    Decrease,
    /// Cycle the device mode, where the device has modes.
    NextMode,
}

/// Interactive control overlay of a selected view.
///
/// Controls translate input into board commands; they never touch the
/// board themselves.
pub trait ControlView {
    fn handle(&mut self, input: ControlInput) -> Option<Command>;
}

// =============================================================================
// VIEW CACHE
// =============================================================================

/// Slot row index for a port: 0..4 for the numbered ports, 4 for the brick.
fn slot_index(port: PortId) -> usize {
    port.index().unwrap_or(PORT_COUNT)
}

/// Fixed-size (kind x port) table of lazily created views.
///
/// Each slot exclusively owns its view for the whole session; lookup is
/// two array indexes, no hashing. Unknown (kind, port) combinations read
/// as absent. The view type defaults to a trait object; a front-end
/// with one concrete panel type can instantiate the cache over it.
pub struct ViewCache<V: DisplayView + ?Sized = dyn DisplayView> {
    slots: [[Option<Box<V>>; PORT_COUNT + 1]; DeviceKind::COUNT],
}

impl<V: DisplayView + ?Sized> ViewCache<V> {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| std::array::from_fn(|_| None)),
        }
    }

    /// The cached view for a device, if one was ever created.
    pub fn get(&self, kind: DeviceKind, port: PortId) -> Option<&V> {
        self.slots[kind.index()][slot_index(port)].as_deref()
    }

    pub fn get_mut(&mut self, kind: DeviceKind, port: PortId) -> Option<&mut V> {
        self.slots[kind.index()][slot_index(port)].as_deref_mut()
    }

    /// The view for a device, created on first access.
    pub fn get_or_create<F>(&mut self, kind: DeviceKind, port: PortId, create: F) -> &mut V
    where
        F: FnOnce() -> Box<V>,
    {
        self.slots[kind.index()][slot_index(port)].get_or_insert_with(create)
    }

    /// Drop the cached view for a device, if any.
    pub fn evict(&mut self, kind: DeviceKind, port: PortId) {
        self.slots[kind.index()][slot_index(port)] = None;
    }

    /// Number of views created so far.
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .flat_map(|row| row.iter())
            .filter(|slot| slot.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Feed a tick's changes into the cached views.
    ///
    /// Only devices the tick reported as changed reach their views, so
    /// an idle board refreshes nothing. Returns the views that now need
    /// a redraw.
    pub fn propagate(
        &mut self,
        report: &StepReport,
        snapshot: &BoardSnapshot,
    ) -> Vec<(DeviceKind, PortId)> {
        let mut dirty = Vec::new();
        for &(kind, port) in &report.changed {
            if let Some(view) = self.slots[kind.index()][slot_index(port)].as_deref_mut() {
                view.update_state(snapshot);
                if view.did_change() {
                    dirty.push((kind, port));
                }
            }
        }
        dirty
    }
}

impl<V: DisplayView + ?Sized> Default for ViewCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================
