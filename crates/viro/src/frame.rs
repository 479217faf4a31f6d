//! Frames and the process-wide frame store.
//!
//! A frame is an insertion-ordered symbol→value table with a parent link
//! forming the lexical chain. Frames are addressed by index into a central
//! store — never by pointer — so closures can capture a frame id and keep
//! its chain alive without reference cycles.
//!
//! # Design Rationale
//!
//! The store reuses freed slots through a free list: function-args frames
//! are released on return unless a closure captured them (or an ancestor)
//! during the call, in which case the whole chain is pinned. Object frames
//! and type-frames are always pinned — object values reference them for as
//! long as any handle exists.

use ahash::AHashMap;
use indexmap::IndexMap;

use crate::{
    intern::Symbol,
    types::Type,
    value::Value,
};

/// Unique identifier for a frame in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u32);

impl FrameId {
    pub(crate) fn new(index: usize) -> Self {
        Self(u32::try_from(index).expect("frame store overflow"))
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// The root (global) frame is always slot 0.
pub(crate) const ROOT_FRAME: FrameId = FrameId(0);

/// What a frame is used for; drives lifetime and boundary behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameKind {
    Root,
    /// Per-call argument frame of a user function.
    FunctionArgs,
    /// Backing storage of an object value.
    Object,
    /// Polymorphic action table for one value type; not part of any chain.
    TypeFrame,
}

type Bindings = IndexMap<Symbol, Value, ahash::RandomState>;

#[derive(Debug)]
pub(crate) struct Frame {
    pub kind: FrameKind,
    pub parent: Option<FrameId>,
    /// Function or type name, for call stacks and molding.
    pub name: Option<Symbol>,
    pub bindings: Bindings,
    /// Pinned frames survive function return (captured by a closure,
    /// referenced by an object value, or structural like root/type-frames).
    pub pinned: bool,
}

impl Frame {
    pub fn new(kind: FrameKind, parent: Option<FrameId>) -> Self {
        // object frames start unpinned so pin_chain can walk through them
        // to the enclosing call frames; their creator pins the chain
        let pinned = matches!(kind, FrameKind::Root | FrameKind::TypeFrame);
        Self {
            kind,
            parent,
            name: None,
            bindings: Bindings::default(),
            pinned,
        }
    }
}

/// Storage for all frames during execution.
#[derive(Debug)]
pub(crate) struct Frames {
    store: Vec<Frame>,
    /// Freed function-args slots available for reuse.
    free: Vec<FrameId>,
    /// Action dispatch tables, one frame per series type.
    type_frames: AHashMap<Type, FrameId>,
}

impl Frames {
    /// Creates the store with the root frame at slot 0.
    pub fn new() -> Self {
        Self {
            store: vec![Frame::new(FrameKind::Root, None)],
            free: Vec::new(),
            type_frames: AHashMap::new(),
        }
    }

    pub fn get(&self, id: FrameId) -> &Frame {
        &self.store[id.index()]
    }

    /// Allocates a frame, reusing a freed slot when available.
    pub fn alloc(&mut self, frame: Frame) -> FrameId {
        if let Some(id) = self.free.pop() {
            self.store[id.index()] = frame;
            id
        } else {
            let id = FrameId::new(self.store.len());
            self.store.push(frame);
            id
        }
    }

    /// Releases a function-args frame after return, unless pinned.
    pub fn release(&mut self, id: FrameId) {
        let frame = &mut self.store[id.index()];
        if frame.pinned || !matches!(frame.kind, FrameKind::FunctionArgs) {
            return;
        }
        frame.bindings.clear();
        self.free.push(id);
    }

    /// Pins a frame and its ancestors so a captured chain outlives the call
    /// that created it. Stops early at the first already-pinned frame — its
    /// ancestors are pinned by induction.
    pub fn pin_chain(&mut self, id: FrameId) {
        let mut current = Some(id);
        while let Some(fid) = current {
            let frame = &mut self.store[fid.index()];
            if frame.pinned {
                break;
            }
            frame.pinned = true;
            current = frame.parent;
        }
    }

    /// Resolves a symbol along the parent chain, innermost first.
    pub fn resolve(&self, start: FrameId, sym: Symbol) -> Option<Value> {
        let mut current = Some(start);
        while let Some(fid) = current {
            let frame = &self.store[fid.index()];
            if let Some(value) = frame.bindings.get(&sym) {
                return Some(value.clone());
            }
            current = frame.parent;
        }
        None
    }

    /// Creates or updates a binding in exactly the given frame.
    pub fn bind(&mut self, id: FrameId, sym: Symbol, value: Value) {
        self.store[id.index()].bindings.insert(sym, value);
    }

    /// Registers the action table frame for a value type.
    pub fn register_type_frame(&mut self, ty: Type, name: Symbol) -> FrameId {
        let mut frame = Frame::new(FrameKind::TypeFrame, Some(ROOT_FRAME));
        frame.name = Some(name);
        let id = self.alloc(frame);
        self.type_frames.insert(ty, id);
        id
    }

    /// Looks up the action implementation for `action` on values of `ty`.
    pub fn action_impl(&self, ty: Type, action: Symbol) -> Option<Value> {
        let id = *self.type_frames.get(&ty)?;
        self.store[id.index()].bindings.get(&action).cloned()
    }

    /// Binds one action implementation into the type-frame of `ty`.
    ///
    /// # Panics
    /// Panics if the type-frame was not registered first.
    pub fn bind_action(&mut self, ty: Type, action: Symbol, value: Value) {
        let id = *self.type_frames.get(&ty).expect("type frame registered");
        self.store[id.index()].bindings.insert(action, value);
    }
}
