use crate::engine::FaceValidity;
use serde::Serialize;

/// User-facing instruction key derived from face validity.
///
/// String content is illustrative; the rendering layer owns localization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Instruction {
    CenterFace,
    HoldStill,
    ImproveLighting,
    RotateDevice,
    GetReady,
    Measuring,
}

impl Instruction {
    pub fn text(&self) -> &'static str {
        match self {
            Instruction::CenterFace => "Center your face in the frame",
            Instruction::HoldStill => "Keep your head straight and still",
            Instruction::ImproveLighting => "Find more even lighting on your face",
            Instruction::RotateDevice => "Hold the device upright",
            Instruction::GetReady => "Great, hold that position",
            Instruction::Measuring => "Hold still, measuring...",
        }
    }
}

/// Orchestrator flags that shift instruction wording for the same validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuidanceFlags {
    pub is_measuring: bool,
    pub is_processing_frames: bool,
}

/// Guidance output for one classified frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuidanceUpdate {
    pub face_detected: bool,
    pub face_valid: bool,
    pub instruction: Instruction,
}

/// Maps per-frame validity to guidance, emitting only on transitions.
///
/// Validity callbacks arrive at frame rate; recomputing the derived value
/// every frame is fine, but downstream updates fire only when it actually
/// changed, so instruction text cannot flicker.
#[derive(Debug, Default)]
pub struct FaceGuidanceEvaluator {
    last: Option<GuidanceUpdate>,
}

impl FaceGuidanceEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate one frame. Returns `Some` only when the derived guidance
    /// differs from the previous frame's.
    pub fn evaluate(
        &mut self,
        validity: FaceValidity,
        flags: GuidanceFlags,
    ) -> Option<GuidanceUpdate> {
        let update = GuidanceUpdate {
            face_detected: validity.face_detected(),
            face_valid: validity.is_valid(),
            instruction: instruction_for(validity, flags),
        };

        if self.last == Some(update) {
            return None;
        }

        self.last = Some(update);
        Some(update)
    }

    /// Forget the last frame, forcing the next evaluation to emit.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

fn instruction_for(validity: FaceValidity, flags: GuidanceFlags) -> Instruction {
    match validity {
        FaceValidity::InvalidRoi => Instruction::CenterFace,
        FaceValidity::TiltedHead => Instruction::HoldStill,
        FaceValidity::UnevenLight => Instruction::ImproveLighting,
        FaceValidity::InvalidDeviceOrientation => Instruction::RotateDevice,
        FaceValidity::Valid => {
            if flags.is_measuring && flags.is_processing_frames {
                Instruction::Measuring
            } else {
                Instruction::GetReady
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE: GuidanceFlags = GuidanceFlags {
        is_measuring: false,
        is_processing_frames: false,
    };

    const MEASURING: GuidanceFlags = GuidanceFlags {
        is_measuring: true,
        is_processing_frames: true,
    };

    #[test]
    fn first_frame_always_emits() {
        let mut evaluator = FaceGuidanceEvaluator::new();
        let update = evaluator.evaluate(FaceValidity::Valid, IDLE).unwrap();
        assert!(update.face_valid);
        assert_eq!(update.instruction, Instruction::GetReady);
    }

    #[test]
    fn repeated_frames_are_suppressed() {
        let mut evaluator = FaceGuidanceEvaluator::new();
        assert!(evaluator.evaluate(FaceValidity::Valid, IDLE).is_some());
        assert!(evaluator.evaluate(FaceValidity::Valid, IDLE).is_none());
        assert!(evaluator.evaluate(FaceValidity::Valid, IDLE).is_none());
    }

    #[test]
    fn validity_transition_emits() {
        let mut evaluator = FaceGuidanceEvaluator::new();
        evaluator.evaluate(FaceValidity::Valid, IDLE);

        let update = evaluator.evaluate(FaceValidity::TiltedHead, IDLE).unwrap();
        assert!(update.face_detected);
        assert!(!update.face_valid);
        assert_eq!(update.instruction, Instruction::HoldStill);
    }

    #[test]
    fn same_validity_different_phase_emits() {
        let mut evaluator = FaceGuidanceEvaluator::new();
        let before = evaluator.evaluate(FaceValidity::Valid, IDLE).unwrap();
        assert_eq!(before.instruction, Instruction::GetReady);

        // Measurement began between frames; wording changes for the same
        // validity value, so this counts as a transition.
        let during = evaluator.evaluate(FaceValidity::Valid, MEASURING).unwrap();
        assert_eq!(during.instruction, Instruction::Measuring);
    }

    #[test]
    fn roi_loss_reports_face_undetected() {
        let mut evaluator = FaceGuidanceEvaluator::new();
        let update = evaluator.evaluate(FaceValidity::InvalidRoi, MEASURING).unwrap();
        assert!(!update.face_detected);
        assert_eq!(update.instruction, Instruction::CenterFace);
    }

    #[test]
    fn reset_forces_reemission() {
        let mut evaluator = FaceGuidanceEvaluator::new();
        evaluator.evaluate(FaceValidity::Valid, IDLE);
        evaluator.reset();
        assert!(evaluator.evaluate(FaceValidity::Valid, IDLE).is_some());
    }
}
