use crate::cut::{CutRejection, Time, TriggerParams};
use crate::math::{Isometry, Point, Real, UnitVector};

/// The arming state of the cutting tool.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ToolState {
    /// The tool is not held: cut input is ignored.
    Idle,
    /// The tool was just equipped.
    Arming {
        /// Presses are ignored until this time.
        deadline: Time,
        /// Must the input be seen released before arming?
        require_release: bool,
        /// Was the input seen released since equipping?
        released_seen: bool,
    },
    /// Cut presses are accepted.
    Armed,
}

/// A cut input press.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PressEvent {
    /// When the press happened.
    pub time: Time,
    /// The world pose of the tool when the press happened.
    pub tool_pose: Isometry<Real>,
    /// Was the pointer over a UI surface?
    pub pointer_over_ui: bool,
}

/// Decides when a cut press is allowed to fire.
///
/// Equipping the tool starts an arming phase. The tool arms once the arming
/// delay elapsed and, if required, once the cut input was seen released:
/// the press that equipped the tool must never be read as a cut.
#[derive(Clone, Debug)]
pub struct CutTrigger {
    params: TriggerParams,
    state: ToolState,
}

impl CutTrigger {
    /// An idle trigger.
    pub fn new(params: TriggerParams) -> Self {
        Self {
            params,
            state: ToolState::Idle,
        }
    }

    /// The current state.
    pub fn state(&self) -> ToolState {
        self.state
    }

    /// Are cut presses accepted?
    pub fn is_armed(&self) -> bool {
        self.state == ToolState::Armed
    }

    /// Handles a tool ownership change.
    ///
    /// `input_held` tells whether the cut input is currently held down.
    pub fn set_tool_armed(&mut self, armed: bool, now: Time, input_held: bool) {
        if !armed {
            self.state = ToolState::Idle;
            return;
        }

        if self.state != ToolState::Idle {
            return;
        }

        self.state = ToolState::Arming {
            deadline: now + self.params.arm_delay,
            require_release: self.params.require_release,
            released_seen: !input_held,
        };
        log::debug!("Cutting tool arming until {}.", now + self.params.arm_delay);
    }

    /// Observes the cut input. Called once per visual frame.
    pub fn update(&mut self, now: Time, input_held: bool) {
        if let ToolState::Arming {
            deadline,
            require_release,
            released_seen,
        } = &mut self.state
        {
            *released_seen |= !input_held;

            if now >= *deadline && (!*require_release || *released_seen) {
                self.state = ToolState::Armed;
                log::debug!("Cutting tool armed.");
            }
        }
    }

    /// Accepts or rejects a press. On success, returns the world-space cut
    /// plane derived from the tool pose.
    pub fn accept_press(
        &self,
        press: &PressEvent,
    ) -> Result<(Point<Real>, UnitVector<Real>), CutRejection> {
        if !self.is_armed() {
            return Err(CutRejection::NotArmed);
        }
        if press.pointer_over_ui {
            return Err(CutRejection::PointerOverUi);
        }

        let point = Point::from(press.tool_pose.translation.vector);
        let normal = press.tool_pose.rotation * self.params.blade_normal;
        Ok((point, normal))
    }
}
