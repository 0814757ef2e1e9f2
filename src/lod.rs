//! Level-of-detail state machine: interaction context and zoom bands.
//!
//! Two independent axes combine into one state object. The *context* axis
//! is an explicit FSM — workspace → conversation → message — with snapshot
//! history for reverse transitions. The *zoom* axis is a pure function of
//! the continuous zoom value, classified into overview/normal/detail bands.
//! Consumers read a composite [`LodState`] snapshot carrying derived
//! interaction capabilities and styling parameters; they never mutate it.
//!
//! Illegal context transitions (wrong source state) are silent no-ops so
//! speculative calls from UI code are harmless. Callers that need to know
//! beforehand guard with [`LoDManager::can_perform_interaction`].

#[cfg(test)]
#[path = "lod_test.rs"]
mod lod_test;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{NORMAL_MAX_ZOOM, OVERVIEW_MAX_ZOOM};

/// Which interaction lens is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextLevel {
    /// Canvas level — no conversation locked.
    Workspace,
    /// Locked to a conversation thread.
    Conversation,
    /// Single message expanded to the viewport.
    Message,
}

/// Which visual-density band the current zoom falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomLevel {
    /// Very zoomed out — minimal detail.
    Overview,
    /// Normal zoom — full detail.
    Normal,
    /// Zoomed in — enhanced detail.
    Detail,
}

/// How panning is allowed in a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanMode {
    Free,
    Vertical,
    None,
}

/// How much message content to render at the current zoom band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentDetail {
    Placeholder,
    Full,
    Enhanced,
}

/// Overall layout mode of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Grid,
    Fullscreen,
}

/// Hex tile kinds with per-kind transparency styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HexKind {
    Message,
    Input,
}

/// Visual state a transparency value applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HexState {
    Base,
    Hover,
    Locked,
}

/// Transparency values for one hex kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransparencyLevels {
    pub base: f64,
    pub hover: f64,
    pub locked: f64,
}

impl TransparencyLevels {
    /// The value for a visual state.
    #[must_use]
    pub fn for_state(&self, state: HexState) -> f64 {
        match state {
            HexState::Base => self.base,
            HexState::Hover => self.hover,
            HexState::Locked => self.locked,
        }
    }
}

/// Per-hex-kind transparency table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransparencyTable {
    pub message: TransparencyLevels,
    pub input: TransparencyLevels,
}

impl TransparencyTable {
    /// The levels for a hex kind.
    #[must_use]
    pub fn for_kind(&self, kind: HexKind) -> TransparencyLevels {
        match kind {
            HexKind::Message => self.message,
            HexKind::Input => self.input,
        }
    }
}

/// What a hex click does in the current context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HexClickAction {
    LockToConversation,
    ExpandToMessage,
    ReturnToConversation,
}

/// Which interactions a context permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionTable {
    pub hex_click: HexClickAction,
    pub context_menu: bool,
    pub grid_selection: bool,
    pub text_selection: bool,
    pub message_actions: bool,
}

/// Interaction names checked through [`LoDManager::can_perform_interaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    HexClick,
    ContextMenu,
    GridSelection,
    TextSelection,
    MessageActions,
}

/// Static configuration of one context level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContextConfig {
    pub name: &'static str,
    pub description: &'static str,
    pub allow_panning: PanMode,
    pub allow_zooming: bool,
    pub show_controls: bool,
    pub show_instructions: bool,
    pub transparency: TransparencyTable,
    pub interactions: InteractionTable,
    pub layout: Layout,
}

/// Static configuration of one zoom band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoomConfig {
    pub name: &'static str,
    pub show_content: ContentDetail,
    pub show_avatars: bool,
    pub show_timestamps: bool,
    pub show_actions: bool,
    pub animation_speed: f64,
}

const WORKSPACE_CONFIG: ContextConfig = ContextConfig {
    name: "Workspace",
    description: "Canvas overview with all conversations visible",
    allow_panning: PanMode::Free,
    allow_zooming: true,
    show_controls: true,
    show_instructions: true,
    transparency: TransparencyTable {
        message: TransparencyLevels { base: 0.15, hover: 0.25, locked: 0.3 },
        input: TransparencyLevels { base: 0.08, hover: 0.15, locked: 0.2 },
    },
    interactions: InteractionTable {
        hex_click: HexClickAction::LockToConversation,
        context_menu: true,
        grid_selection: true,
        text_selection: false,
        message_actions: false,
    },
    layout: Layout::Grid,
};

const CONVERSATION_CONFIG: ContextConfig = ContextConfig {
    name: "Conversation",
    description: "Locked to a specific conversation thread",
    allow_panning: PanMode::Vertical,
    allow_zooming: false,
    show_controls: true,
    show_instructions: false,
    transparency: TransparencyTable {
        message: TransparencyLevels { base: 0.3, hover: 0.4, locked: 0.5 },
        input: TransparencyLevels { base: 0.2, hover: 0.3, locked: 0.4 },
    },
    interactions: InteractionTable {
        hex_click: HexClickAction::ExpandToMessage,
        context_menu: true,
        grid_selection: false,
        text_selection: true,
        message_actions: true,
    },
    layout: Layout::Grid,
};

const MESSAGE_CONFIG: ContextConfig = ContextConfig {
    name: "Message",
    description: "Single message expanded to full viewport",
    allow_panning: PanMode::None,
    allow_zooming: false,
    show_controls: false,
    show_instructions: false,
    transparency: TransparencyTable {
        message: TransparencyLevels { base: 0.6, hover: 0.7, locked: 0.8 },
        input: TransparencyLevels { base: 0.4, hover: 0.5, locked: 0.6 },
    },
    interactions: InteractionTable {
        hex_click: HexClickAction::ReturnToConversation,
        context_menu: true,
        grid_selection: false,
        text_selection: true,
        message_actions: true,
    },
    layout: Layout::Fullscreen,
};

const OVERVIEW_CONFIG: ZoomConfig = ZoomConfig {
    name: "Overview",
    show_content: ContentDetail::Placeholder,
    show_avatars: true,
    show_timestamps: false,
    show_actions: false,
    animation_speed: 0.8,
};

const NORMAL_CONFIG: ZoomConfig = ZoomConfig {
    name: "Normal",
    show_content: ContentDetail::Full,
    show_avatars: true,
    show_timestamps: true,
    show_actions: true,
    animation_speed: 1.0,
};

const DETAIL_CONFIG: ZoomConfig = ZoomConfig {
    name: "Detail",
    show_content: ContentDetail::Enhanced,
    show_avatars: true,
    show_timestamps: true,
    show_actions: true,
    animation_speed: 1.2,
};

/// Static configuration for a context level.
#[must_use]
pub fn context_config(level: ContextLevel) -> &'static ContextConfig {
    match level {
        ContextLevel::Workspace => &WORKSPACE_CONFIG,
        ContextLevel::Conversation => &CONVERSATION_CONFIG,
        ContextLevel::Message => &MESSAGE_CONFIG,
    }
}

/// Static configuration for a zoom band.
#[must_use]
pub fn zoom_config(level: ZoomLevel) -> &'static ZoomConfig {
    match level {
        ZoomLevel::Overview => &OVERVIEW_CONFIG,
        ZoomLevel::Normal => &NORMAL_CONFIG,
        ZoomLevel::Detail => &DETAIL_CONFIG,
    }
}

/// Classify a continuous zoom value into its band.
#[must_use]
pub fn zoom_level_for(zoom: f64) -> ZoomLevel {
    if zoom < OVERVIEW_MAX_ZOOM {
        ZoomLevel::Overview
    } else if zoom < NORMAL_MAX_ZOOM {
        ZoomLevel::Normal
    } else {
        ZoomLevel::Detail
    }
}

/// Derived interaction capabilities for the current state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    pub allow_panning: PanMode,
    pub allow_zooming: bool,
    pub show_controls: bool,
    pub show_instructions: bool,
    pub interactions: InteractionTable,
    pub show_content: ContentDetail,
    pub show_avatars: bool,
    pub show_timestamps: bool,
    pub show_actions: bool,
}

/// Derived styling parameters for the current state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Styling {
    pub transparency: TransparencyTable,
    pub animation_speed: f64,
    pub layout: Layout,
}

/// Context-axis half of a [`LodState`] snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextState {
    pub level: ContextLevel,
    pub conversation_id: Option<String>,
    pub message_id: Option<String>,
    pub is_locked: bool,
}

/// Zoom-axis half of a [`LodState`] snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomState {
    pub level: ZoomLevel,
    pub value: f64,
}

/// Read-only composite snapshot consumed by rendering and input layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LodState {
    pub context: ContextState,
    pub zoom: ZoomState,
    pub capabilities: Capabilities,
    pub styling: Styling,
}

/// A context transition that was accepted and applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Transition {
    LockToConversation {
        conversation_id: String,
        message_id: Option<String>,
    },
    ExpandToMessage {
        message_id: String,
    },
    ReturnToConversation {
        message_id: Option<String>,
    },
    ReturnToWorkspace,
}

/// Callbacks installed through [`LoDManager::initialize`].
#[derive(Default)]
pub struct LodCallbacks {
    /// Fired synchronously after every accepted mutation.
    pub on_state_change: Option<Box<dyn FnMut(&LodState)>>,
    /// Fired additionally for context transitions.
    pub on_transition: Option<Box<dyn FnMut(&Transition, &LodState)>>,
}

/// Identifies one subscribed state-change observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Snapshot pushed on forward context transitions.
#[derive(Debug, Clone)]
struct HistoryEntry {
    context_level: ContextLevel,
    conversation_id: Option<String>,
    message_id: Option<String>,
    is_locked: bool,
}

/// The dual-axis LoD state machine.
pub struct LoDManager {
    context_level: ContextLevel,
    zoom_level: ZoomLevel,
    current_zoom: f64,
    is_locked: bool,
    conversation_id: Option<String>,
    message_id: Option<String>,
    history: Vec<HistoryEntry>,
    callbacks: LodCallbacks,
    listeners: Vec<(ListenerId, Box<dyn FnMut(&LodState)>)>,
    next_listener_id: u64,
}

impl Default for LoDManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LoDManager {
    /// A fresh manager at workspace level, normal zoom.
    #[must_use]
    pub fn new() -> Self {
        Self {
            context_level: ContextLevel::Workspace,
            zoom_level: ZoomLevel::Normal,
            current_zoom: 1.0,
            is_locked: false,
            conversation_id: None,
            message_id: None,
            history: Vec::new(),
            callbacks: LodCallbacks::default(),
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    /// Install the primary callbacks and fire the initial state change.
    pub fn initialize(&mut self, callbacks: LodCallbacks) {
        self.callbacks = callbacks;
        self.notify_state_change();
    }

    /// Register an extra state-change observer. Observers are invoked
    /// synchronously, exactly once per accepted mutation.
    pub fn subscribe(&mut self, callback: Box<dyn FnMut(&LodState)>) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, callback));
        id
    }

    /// Remove a subscribed observer. Returns `false` for unknown ids.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// The current context level.
    #[must_use]
    pub fn context_level(&self) -> ContextLevel {
        self.context_level
    }

    /// The current zoom band.
    #[must_use]
    pub fn zoom_level(&self) -> ZoomLevel {
        self.zoom_level
    }

    /// The continuous zoom value last fed in.
    #[must_use]
    pub fn current_zoom(&self) -> f64 {
        self.current_zoom
    }

    /// Whether the view is locked to a conversation or message.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    /// The locked conversation, if any.
    #[must_use]
    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// The focused message, if any.
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    /// Number of forward transitions not yet undone.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Feed the continuous zoom value; fires a state change only when the
    /// band actually changes.
    pub fn update_zoom(&mut self, zoom: f64) {
        self.current_zoom = zoom;
        let band = zoom_level_for(zoom);
        if band != self.zoom_level {
            debug!(?band, zoom, "zoom band changed");
            self.zoom_level = band;
            self.notify_state_change();
        }
    }

    /// Workspace → Conversation. Pushes a history snapshot and locks.
    /// No-op from any other state.
    pub fn lock_to_conversation(&mut self, conversation_id: &str, message_id: Option<&str>) {
        if self.context_level != ContextLevel::Workspace {
            return;
        }
        self.push_history();
        self.context_level = ContextLevel::Conversation;
        self.conversation_id = Some(conversation_id.to_string());
        self.message_id = message_id.map(String::from);
        self.is_locked = true;
        debug!(conversation_id, "locked to conversation");

        self.notify_transition(&Transition::LockToConversation {
            conversation_id: conversation_id.to_string(),
            message_id: message_id.map(String::from),
        });
        self.notify_state_change();
    }

    /// Conversation → Message. Pushes a history snapshot.
    /// No-op from any other state.
    pub fn expand_to_message(&mut self, message_id: &str) {
        if self.context_level != ContextLevel::Conversation {
            return;
        }
        self.push_history();
        self.context_level = ContextLevel::Message;
        self.message_id = Some(message_id.to_string());
        debug!(message_id, "expanded to message");

        self.notify_transition(&Transition::ExpandToMessage {
            message_id: message_id.to_string(),
        });
        self.notify_state_change();
    }

    /// Message → Conversation, restoring the ids saved before the expand.
    /// No-op from any other state.
    pub fn return_to_conversation(&mut self) {
        if self.context_level != ContextLevel::Message {
            return;
        }
        let Some(entry) = self.history.pop() else {
            return;
        };
        // The entry on top was pushed by expand_to_message, so its level is
        // always Conversation.
        self.context_level = entry.context_level;
        self.conversation_id = entry.conversation_id;
        self.message_id = entry.message_id;
        self.is_locked = entry.is_locked;
        debug!("returned to conversation");

        self.notify_transition(&Transition::ReturnToConversation {
            message_id: self.message_id.clone(),
        });
        self.notify_state_change();
    }

    /// Any non-workspace state → Workspace: clears ids, unlocks, empties
    /// history. No-op when already there.
    pub fn return_to_workspace(&mut self) {
        if self.context_level == ContextLevel::Workspace {
            return;
        }
        self.context_level = ContextLevel::Workspace;
        self.conversation_id = None;
        self.message_id = None;
        self.is_locked = false;
        self.history.clear();
        debug!("returned to workspace");

        self.notify_transition(&Transition::ReturnToWorkspace);
        self.notify_state_change();
    }

    /// Force unlock — alias for [`Self::return_to_workspace`].
    pub fn unlock(&mut self) {
        self.return_to_workspace();
    }

    /// The composite read-only snapshot.
    #[must_use]
    pub fn current_state(&self) -> LodState {
        let context = context_config(self.context_level);
        let zoom = zoom_config(self.zoom_level);
        LodState {
            context: ContextState {
                level: self.context_level,
                conversation_id: self.conversation_id.clone(),
                message_id: self.message_id.clone(),
                is_locked: self.is_locked,
            },
            zoom: ZoomState {
                level: self.zoom_level,
                value: self.current_zoom,
            },
            capabilities: Capabilities {
                allow_panning: context.allow_panning,
                allow_zooming: context.allow_zooming,
                show_controls: context.show_controls,
                show_instructions: context.show_instructions,
                interactions: context.interactions,
                show_content: zoom.show_content,
                show_avatars: zoom.show_avatars,
                show_timestamps: zoom.show_timestamps,
                show_actions: zoom.show_actions && context.interactions.message_actions,
            },
            styling: Styling {
                transparency: context.transparency,
                animation_speed: zoom.animation_speed,
                layout: context.layout,
            },
        }
    }

    /// Whether the named interaction is allowed right now.
    #[must_use]
    pub fn can_perform_interaction(&self, interaction: Interaction) -> bool {
        let interactions = context_config(self.context_level).interactions;
        match interaction {
            Interaction::HexClick => true,
            Interaction::ContextMenu => interactions.context_menu,
            Interaction::GridSelection => interactions.grid_selection,
            Interaction::TextSelection => interactions.text_selection,
            Interaction::MessageActions => interactions.message_actions,
        }
    }

    /// Transparency for a hex kind in a visual state under the current
    /// context.
    #[must_use]
    pub fn hex_transparency(&self, kind: HexKind, state: HexState) -> f64 {
        context_config(self.context_level)
            .transparency
            .for_kind(kind)
            .for_state(state)
    }

    fn push_history(&mut self) {
        self.history.push(HistoryEntry {
            context_level: self.context_level,
            conversation_id: self.conversation_id.clone(),
            message_id: self.message_id.clone(),
            is_locked: self.is_locked,
        });
    }

    fn notify_state_change(&mut self) {
        let state = self.current_state();
        if let Some(callback) = self.callbacks.on_state_change.as_mut() {
            callback(&state);
        }
        for (_, listener) in &mut self.listeners {
            listener(&state);
        }
    }

    fn notify_transition(&mut self, transition: &Transition) {
        let state = self.current_state();
        if let Some(callback) = self.callbacks.on_transition.as_mut() {
            callback(transition, &state);
        }
    }
}
